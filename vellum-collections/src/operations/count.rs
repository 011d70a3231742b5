use vellum_data::{CountQuery, DataError, DatabaseAdapter, FieldSchema, TotalDocs};

use super::{guarded, CountArgs, CountTarget};
use crate::access::AccessRule;
use crate::config::Collection;
use crate::error::OperationError;
use crate::hooks::Operation;

struct Count;

impl CountTarget for Count {
    const OPERATION: Operation = Operation::Count;

    fn access_rule(collection: &Collection) -> Option<&AccessRule> {
        collection.config().access.read.as_ref()
    }

    fn schema(collection: &Collection) -> FieldSchema {
        collection.config().document_schema()
    }

    async fn delegate<A: DatabaseAdapter>(db: &A, query: CountQuery) -> Result<TotalDocs, DataError> {
        db.count(query).await
    }
}

/// Count the documents of a collection visible to `args.ctx`.
///
/// Checks the collection's `read` access rule and filters against the
/// document fields.
pub async fn count_operation<A: DatabaseAdapter>(
    db: &A,
    args: CountArgs,
) -> Result<TotalDocs, OperationError> {
    guarded::<Count, A>(db, args).await
}
