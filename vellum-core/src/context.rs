use std::convert::Infallible;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::http::extract::FromRequestParts;
use crate::http::header::Parts;
use crate::identity::Identity;
use crate::transaction::TransactionHandle;

/// Request extension inserted by an authentication layer.
///
/// [`RequestContext`] extraction picks it up when no context was attached
/// to the request yet.
#[derive(Clone)]
pub struct CurrentIdentity(pub Arc<dyn Identity>);

/// Explicit per-request context passed into every operation.
///
/// Carries the acting identity, the request-scoped transaction handle and a
/// shared key/value map hooks can use to hand data to each other. Clones are
/// cheap and share the transaction slot and hook map.
#[derive(Clone)]
pub struct RequestContext {
    id: Uuid,
    identity: Option<Arc<dyn Identity>>,
    transaction: Arc<Mutex<Option<Arc<dyn TransactionHandle>>>>,
    values: Arc<DashMap<String, serde_json::Value>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: None,
            transaction: Arc::new(Mutex::new(None)),
            values: Arc::new(DashMap::new()),
        }
    }

    /// Attach the acting identity.
    pub fn with_identity(self, identity: impl Identity) -> Self {
        let identity: Arc<dyn Identity> = Arc::new(identity);
        self.with_shared_identity(identity)
    }

    /// Attach an already shared identity.
    pub fn with_shared_identity(mut self, identity: Arc<dyn Identity>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Attach a transaction handle.
    pub fn with_transaction(self, tx: Arc<dyn TransactionHandle>) -> Self {
        Self {
            transaction: Arc::new(Mutex::new(Some(tx))),
            ..self
        }
    }

    /// Request id, generated when the context is created.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> Option<&dyn Identity> {
        self.identity.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Attach (or replace) the transaction for this request and every clone of it.
    pub async fn attach_transaction(&self, tx: Arc<dyn TransactionHandle>) {
        *self.transaction.lock().await = Some(tx);
    }

    /// The active transaction, if one is attached.
    pub async fn transaction(&self) -> Option<Arc<dyn TransactionHandle>> {
        self.transaction.lock().await.clone()
    }

    /// Detach the active transaction. Later calls return `None`.
    pub async fn take_transaction(&self) -> Option<Arc<dyn TransactionHandle>> {
        self.transaction.lock().await.take()
    }

    /// Store a value in the shared hook context.
    pub fn set_value(&self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Read a value from the shared hook context.
    pub fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).map(|v| v.value().clone())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("identity", &self.identity.as_ref().map(|i| i.sub().to_string()))
            .field("values", &self.values.len())
            .finish()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(ctx.clone());
        }

        let mut ctx = RequestContext::new();
        if let Some(CurrentIdentity(identity)) = parts.extensions.get::<CurrentIdentity>() {
            ctx.identity = Some(identity.clone());
        }
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}
