use std::future::Future;

use serde::{Deserialize, Serialize};
use vellum_core::RequestContext;

use crate::error::DataError;
use crate::filter::Where;

/// Result of a count operation, serialized as `{ "totalDocs": n }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalDocs {
    pub total_docs: u64,
}

impl TotalDocs {
    pub fn new(total_docs: u64) -> Self {
        Self { total_docs }
    }
}

/// Arguments handed to an adapter count call. The filter is already
/// access-merged, sanitized, and validated.
#[derive(Debug, Clone)]
pub struct CountQuery {
    /// Collection slug.
    pub collection: String,
    pub ctx: RequestContext,
    pub filter: Where,
}

/// Storage backend contract.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
/// Implementations should run inside the transaction attached to
/// `query.ctx` when they recognise it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `DatabaseAdapter`",
    label = "this type cannot back collection operations",
    note = "implement `count` and `count_versions` for your storage backend"
)]
pub trait DatabaseAdapter: Send + Sync {
    /// Count documents of a collection.
    fn count(&self, query: CountQuery) -> impl Future<Output = Result<TotalDocs, DataError>> + Send;

    /// Count stored versions of a collection's documents.
    fn count_versions(
        &self,
        query: CountQuery,
    ) -> impl Future<Output = Result<TotalDocs, DataError>> + Send;
}
