//! Pre-signed PUT URLs.
//!
//! [`SigningClient`] is the seam the upload handler signs through.
//! [`SigV4Signer`] implements it with AWS Signature Version 4 query-string
//! authentication and works against S3 and S3-compatible endpoints.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::{ObjectAcl, S3StorageConfig};
use crate::encryption::EncryptionParams;
use vellum_core::BoxError;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Longest validity SigV4 accepts for a pre-signed URL (7 days).
pub const MAX_EXPIRES: Duration = Duration::from_secs(604_800);

/// A PUT of a single object, to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub acl: Option<ObjectAcl>,
    pub encryption: Option<EncryptionParams>,
}

/// Errors raised while producing a signed URL.
#[derive(Debug)]
pub enum SignError {
    /// Access key id or secret key is empty.
    MissingCredentials,
    InvalidEndpoint(String),
    InvalidRequest(String),
    /// Failure reported by a remote signing service.
    Upstream(BoxError),
}

impl std::fmt::Display for SignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignError::MissingCredentials => write!(f, "S3 credentials are not configured"),
            SignError::InvalidEndpoint(msg) => write!(f, "Invalid S3 endpoint: {msg}"),
            SignError::InvalidRequest(msg) => write!(f, "Cannot sign request: {msg}"),
            SignError::Upstream(err) => write!(f, "Signing failed: {err}"),
        }
    }
}

impl std::error::Error for SignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignError::Upstream(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Produces time-limited URLs that let a client upload directly to storage.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot sign upload URLs",
    label = "this type does not implement `SigningClient`",
    note = "use `SigV4Signer` or implement `presign_put` for your storage client"
)]
pub trait SigningClient: Send + Sync + 'static {
    fn presign_put(
        &self,
        request: &PutObjectRequest,
        expires_in: Duration,
    ) -> impl Future<Output = Result<String, SignError>> + Send;
}

/// AWS SigV4 query-string signer producing path-style URLs.
#[derive(Clone)]
pub struct SigV4Signer {
    endpoint: Url,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    timestamp: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigV4Signer")
            .field("endpoint", &self.endpoint.as_str())
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl SigV4Signer {
    pub fn new(
        endpoint: &str,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, SignError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| SignError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(SignError::InvalidEndpoint(format!("{endpoint} has no host")));
        }

        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return Err(SignError::MissingCredentials);
        }

        Ok(Self {
            endpoint,
            region: region.into(),
            access_key_id,
            secret_access_key,
            timestamp: None,
        })
    }

    /// Signer for the configured endpoint, or `https://s3.{region}.amazonaws.com`.
    pub fn from_config(config: &S3StorageConfig) -> Result<Self, SignError> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        Self::new(
            &endpoint,
            config.region.clone(),
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
        )
    }

    /// Sign with a fixed timestamp instead of the current time.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// `host[:port]` as sent in the `Host` header.
    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Build the signed URL for `request`.
    pub fn sign_put(
        &self,
        request: &PutObjectRequest,
        expires_in: Duration,
    ) -> Result<String, SignError> {
        if request.bucket.is_empty() || request.key.is_empty() {
            return Err(SignError::InvalidRequest("bucket and key are required".into()));
        }
        if expires_in.is_zero() || expires_in > MAX_EXPIRES {
            return Err(SignError::InvalidRequest(format!(
                "expiry must be between 1 and {} seconds",
                MAX_EXPIRES.as_secs()
            )));
        }

        let now = self.timestamp.unwrap_or_else(Utc::now);
        let host = self.host();
        let canonical_uri = uri_encode_path(&format!("/{}/{}", request.bucket, request.key));

        let mut params = BTreeMap::new();
        params.insert("X-Amz-Content-Sha256".to_string(), UNSIGNED_PAYLOAD.to_string());
        if let Some(acl) = request.acl {
            params.insert("x-amz-acl".to_string(), acl.as_str().to_string());
        }
        if let Some(encryption) = &request.encryption {
            for (name, value) in encryption.amz_headers() {
                params.insert(name.to_string(), value);
            }
        }

        let mut headers = BTreeMap::new();
        headers.insert("content-type", request.content_type.trim().to_string());
        headers.insert("host", host.clone());

        let presigned = Presign {
            method: "PUT",
            canonical_uri: &canonical_uri,
            headers: &headers,
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            region: &self.region,
            timestamp: now,
            expires_secs: expires_in.as_secs(),
        };
        let query = presigned.signed_query(params)?;

        tracing::debug!(
            bucket = %request.bucket,
            key = %request.key,
            expires_secs = expires_in.as_secs(),
            "signed PUT URL"
        );
        Ok(format!(
            "{}://{host}{canonical_uri}?{query}",
            self.endpoint.scheme()
        ))
    }
}

impl SigningClient for SigV4Signer {
    async fn presign_put(
        &self,
        request: &PutObjectRequest,
        expires_in: Duration,
    ) -> Result<String, SignError> {
        self.sign_put(request, expires_in)
    }
}

/// One query-string signing computation.
struct Presign<'a> {
    method: &'a str,
    canonical_uri: &'a str,
    /// Lowercase header names, all of them signed.
    headers: &'a BTreeMap<&'a str, String>,
    access_key_id: &'a str,
    secret_access_key: &'a str,
    region: &'a str,
    timestamp: DateTime<Utc>,
    expires_secs: u64,
}

impl Presign<'_> {
    /// The canonical query string of `extra` plus the `X-Amz-*` auth
    /// parameters, followed by `&X-Amz-Signature=...`.
    fn signed_query(&self, mut params: BTreeMap<String, String>) -> Result<String, SignError> {
        let date = self.timestamp.format("%Y%m%d").to_string();
        let amz_date = self.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let signed_headers = self.headers.keys().copied().collect::<Vec<_>>().join(";");

        params.insert("X-Amz-Algorithm".to_string(), ALGORITHM.to_string());
        params.insert(
            "X-Amz-Credential".to_string(),
            format!("{}/{scope}", self.access_key_id),
        );
        params.insert("X-Amz-Date".to_string(), amz_date.clone());
        params.insert("X-Amz-Expires".to_string(), self.expires_secs.to_string());
        params.insert("X-Amz-SignedHeaders".to_string(), signed_headers.clone());
        let query = canonical_query_string(&params);

        let canonical_headers: String = self
            .headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        let canonical_request = format!(
            "{}\n{}\n{query}\n{canonical_headers}\n{signed_headers}\n{UNSIGNED_PAYLOAD}",
            self.method, self.canonical_uri
        );

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex_sha256(canonical_request.as_bytes())
        );

        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        )?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
        let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

        Ok(format!("{query}&X-Amz-Signature={signature}"))
    }
}

fn uri_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_slash => out.push('/'),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

fn uri_encode_path(path: &str) -> String {
    uri_encode(path, true)
}

fn canonical_query_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k, false), uri_encode(v, false)))
        .collect::<Vec<_>>()
        .join("&")
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SignError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| SignError::InvalidRequest(format!("HMAC key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
