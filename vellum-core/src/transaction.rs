//! Request-scoped transaction handles and failure-path rollback.
//!
//! A transaction is opened by whoever owns the request lifecycle (a handler,
//! a middleware, a test) and attached to the [`RequestContext`]. Operations
//! never commit: on success the owner commits, on failure the operation calls
//! [`kill_transaction`] before propagating its error.
//!
//! ```ignore
//! let tx = SqlxTransaction::begin(&pool).await?;
//! let ctx = RequestContext::new().with_transaction(tx.clone());
//!
//! match count_versions_operation(&db, args(&ctx)).await {
//!     Ok(total) => { tx.commit().await?; Ok(total) }
//!     // already rolled back by the operation
//!     Err(e) => Err(e),
//! }
//! ```

use std::any::Any;

use futures_util::future::BoxFuture;

use crate::context::RequestContext;

/// Boxed error returned by transaction backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A storage-layer transaction attached to a request.
///
/// Implementations must make `rollback` idempotent: rolling back a handle that
/// was already finished (committed or rolled back) is a successful no-op.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `TransactionHandle`",
    label = "this type cannot be attached to a request context",
    note = "implement `id`, `rollback` and `as_any` for your transaction wrapper"
)]
pub trait TransactionHandle: Send + Sync + 'static {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// Roll back the transaction.
    fn rollback(&self) -> BoxFuture<'_, Result<(), BoxError>>;

    /// Downcast hook so adapters can run queries on their own transaction type.
    fn as_any(&self) -> &dyn Any;
}

/// Roll back the transaction attached to `ctx`, if any.
///
/// The handle is detached from the context first, so a second call is a
/// no-op. Rollback failures are logged and swallowed: the caller is always
/// on an error path and must propagate its original error.
pub async fn kill_transaction(ctx: &RequestContext) {
    let Some(tx) = ctx.take_transaction().await else {
        return;
    };

    match tx.rollback().await {
        Ok(()) => {
            tracing::debug!(request_id = %ctx.id(), transaction = tx.id(), "transaction rolled back");
        }
        Err(err) => {
            tracing::warn!(
                request_id = %ctx.id(),
                transaction = tx.id(),
                error = %err,
                "transaction rollback failed"
            );
        }
    }
}
