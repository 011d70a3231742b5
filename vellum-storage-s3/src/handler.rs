use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use garde::Validate;
use serde::{Deserialize, Serialize};
use vellum_core::http::extract::State;
use vellum_core::http::header::CONTENT_TYPE;
use vellum_core::http::response::{IntoResponse, Response};
use vellum_core::http::routing::post;
use vellum_core::http::{Bytes, HeaderMap, Json, Router};
use vellum_core::{HttpError, RequestContext, ValidationErrorResponse};

use crate::config::{CollectionStorageOptions, ObjectAcl, S3StorageConfig};
use crate::encryption::{get_encryption_params, EncryptionConfig};
use crate::key::{object_key, KeyError};
use crate::signer::{PutObjectRequest, SignError, SigningClient};

/// Route the signed-URL handler is mounted on.
pub const SIGNED_URL_PATH: &str = "/storage-s3-generate-signed-url";

/// Validity window of every signed upload URL.
pub const SIGNED_URL_EXPIRY: Duration = Duration::from_secs(600);

/// Body of a signed-URL request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    #[garde(length(min = 1))]
    pub collection_slug: String,
    #[garde(length(min = 1))]
    pub filename: String,
    #[garde(length(min = 1))]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrlResponse {
    pub url: String,
}

/// Errors returned by the signed-URL handler.
#[derive(Debug)]
pub enum SignedUrlError {
    MalformedRequest(String),
    Invalid(ValidationErrorResponse),
    /// The collection has no storage options.
    CollectionNotFound(String),
    Forbidden,
    Signing(SignError),
}

impl std::fmt::Display for SignedUrlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignedUrlError::MalformedRequest(msg) => write!(f, "{msg}"),
            SignedUrlError::Invalid(resp) => {
                write!(f, "invalid fields: {}", resp.fields().join(", "))
            }
            SignedUrlError::CollectionNotFound(slug) => {
                write!(f, "Collection {slug} was not found in S3 options")
            }
            SignedUrlError::Forbidden => write!(f, "You are not allowed to perform this action."),
            SignedUrlError::Signing(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SignedUrlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignedUrlError::Signing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SignError> for SignedUrlError {
    fn from(err: SignError) -> Self {
        SignedUrlError::Signing(err)
    }
}

impl From<KeyError> for SignedUrlError {
    fn from(err: KeyError) -> Self {
        SignedUrlError::MalformedRequest(err.to_string())
    }
}

impl From<SignedUrlError> for HttpError {
    fn from(err: SignedUrlError) -> Self {
        match err {
            SignedUrlError::Invalid(resp) => HttpError::Validation(resp),
            SignedUrlError::Forbidden => HttpError::Forbidden(err.to_string()),
            SignedUrlError::Signing(ref inner) => {
                tracing::error!(error = %inner, "failed to sign upload URL");
                HttpError::Internal(err.to_string())
            }
            SignedUrlError::MalformedRequest(_) | SignedUrlError::CollectionNotFound(_) => {
                HttpError::BadRequest(err.to_string())
            }
        }
    }
}

impl IntoResponse for SignedUrlError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

/// Input of an upload access predicate.
#[derive(Debug, Clone)]
pub struct UploadAccessArgs {
    pub ctx: RequestContext,
    pub collection_slug: String,
}

/// Decides whether a request may obtain an upload URL for a collection.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an upload access predicate",
    label = "this type cannot decide upload access",
    note = "use an async closure `|args: UploadAccessArgs| async move {{ true }}` or implement `UploadAccess`"
)]
pub trait UploadAccess: Send + Sync + 'static {
    fn allow(&self, args: UploadAccessArgs) -> BoxFuture<'static, bool>;
}

impl<F, Fut> UploadAccess for F
where
    F: Fn(UploadAccessArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn allow(&self, args: UploadAccessArgs) -> BoxFuture<'static, bool> {
        Box::pin(self(args))
    }
}

pub type ClientUploadsAccess = Arc<dyn UploadAccess>;

/// Mints pre-signed PUT URLs so clients upload straight to the bucket.
///
/// ```ignore
/// let handler = SignedUrlHandler::new(SigV4Signer::from_config(&s3)?, &s3.bucket)
///     .collection("media", CollectionStorageOptions::with_prefix("uploads"))
///     .access(|args: UploadAccessArgs| async move { args.ctx.is_authenticated() });
///
/// let app = Router::new().merge(handler.router());
/// ```
pub struct SignedUrlHandler<C> {
    client: Arc<C>,
    bucket: String,
    acl: Option<ObjectAcl>,
    collections: HashMap<String, CollectionStorageOptions>,
    encryption: Option<EncryptionConfig>,
    access: Option<ClientUploadsAccess>,
}

impl<C: SigningClient> SignedUrlHandler<C> {
    pub fn new(client: C, bucket: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            bucket: bucket.into(),
            acl: None,
            collections: HashMap::new(),
            encryption: None,
            access: None,
        }
    }

    /// Handler for the bucket, ACL, encryption and collections of `config`.
    pub fn from_config(client: C, config: &S3StorageConfig) -> Self {
        Self {
            acl: config.acl,
            collections: config.collections.clone(),
            encryption: config.encryption.clone(),
            ..Self::new(client, config.bucket.clone())
        }
    }

    pub fn acl(mut self, acl: ObjectAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn collection(mut self, slug: impl Into<String>, options: CollectionStorageOptions) -> Self {
        self.collections.insert(slug.into(), options);
        self
    }

    pub fn encryption(mut self, encryption: EncryptionConfig) -> Self {
        self.encryption = Some(encryption);
        self
    }

    /// Replace the default predicate (an identity must be present).
    pub fn access(mut self, access: impl UploadAccess) -> Self {
        self.access = Some(Arc::new(access));
        self
    }

    async fn is_allowed(&self, ctx: &RequestContext, collection_slug: &str) -> bool {
        match &self.access {
            Some(access) => {
                access
                    .allow(UploadAccessArgs {
                        ctx: ctx.clone(),
                        collection_slug: collection_slug.to_string(),
                    })
                    .await
            }
            None => ctx.is_authenticated(),
        }
    }

    /// Validate the request and sign a PUT for `<prefix>/<filename>`.
    ///
    /// Nothing is signed unless the collection is configured and the access
    /// predicate allows the request.
    pub async fn handle(
        &self,
        ctx: RequestContext,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<SignedUrlResponse, SignedUrlError> {
        if !is_json(headers) {
            return Err(SignedUrlError::MalformedRequest(
                "Content-Type expected to be application/json".into(),
            ));
        }

        let request: SignedUrlRequest = serde_json::from_slice(body)
            .map_err(|e| SignedUrlError::MalformedRequest(format!("invalid request body: {e}")))?;
        vellum_core::validation::validate(&request).map_err(SignedUrlError::Invalid)?;

        let options = self
            .collections
            .get(&request.collection_slug)
            .ok_or_else(|| SignedUrlError::CollectionNotFound(request.collection_slug.clone()))?;

        if !self.is_allowed(&ctx, &request.collection_slug).await {
            tracing::debug!(collection = %request.collection_slug, "upload URL denied");
            return Err(SignedUrlError::Forbidden);
        }

        let key = object_key(options.prefix(), &request.filename)?;
        let put = PutObjectRequest {
            bucket: self.bucket.clone(),
            key,
            content_type: request.mime_type,
            acl: self.acl,
            encryption: get_encryption_params(self.encryption.as_ref()),
        };

        let url = self.client.presign_put(&put, SIGNED_URL_EXPIRY).await?;
        tracing::debug!(collection = %request.collection_slug, key = %put.key, "issued upload URL");
        Ok(SignedUrlResponse { url })
    }

    /// Router serving `POST /storage-s3-generate-signed-url`.
    pub fn router(self) -> Router {
        Router::new()
            .route(SIGNED_URL_PATH, post(generate_signed_url::<C>))
            .with_state(Arc::new(self))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

async fn generate_signed_url<C: SigningClient>(
    State(handler): State<Arc<SignedUrlHandler<C>>>,
    ctx: RequestContext,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SignedUrlResponse>, SignedUrlError> {
    handler.handle(ctx, &headers, &body).await.map(Json)
}
