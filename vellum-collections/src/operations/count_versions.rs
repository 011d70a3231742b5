use vellum_data::{CountQuery, DataError, DatabaseAdapter, FieldSchema, TotalDocs};

use super::{guarded, CountArgs, CountTarget};
use crate::access::AccessRule;
use crate::config::Collection;
use crate::error::OperationError;
use crate::hooks::Operation;

struct CountVersions;

impl CountTarget for CountVersions {
    const OPERATION: Operation = Operation::CountVersions;

    fn access_rule(collection: &Collection) -> Option<&AccessRule> {
        collection.config().access.read_versions.as_ref()
    }

    fn schema(collection: &Collection) -> FieldSchema {
        collection.config().version_schema()
    }

    async fn delegate<A: DatabaseAdapter>(db: &A, query: CountQuery) -> Result<TotalDocs, DataError> {
        db.count_versions(query).await
    }
}

/// Count the stored versions of a collection's documents.
///
/// Checks the collection's `readVersions` access rule and filters against the
/// version fields (`parent`, `version.*`, timestamps, draft markers).
///
/// ```ignore
/// let args = CountArgs::new(posts.clone(), ctx)
///     .filter(Where::field("parent", Operator::Equals, "42"));
/// let TotalDocs { total_docs } = count_versions_operation(&adapter, args).await?;
/// ```
pub async fn count_versions_operation<A: DatabaseAdapter>(
    db: &A,
    args: CountArgs,
) -> Result<TotalDocs, OperationError> {
    guarded::<CountVersions, A>(db, args).await
}
