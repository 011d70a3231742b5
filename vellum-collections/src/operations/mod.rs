//! Guarded collection operations.
//!
//! Every operation follows the same pipeline:
//!
//! 1. before-operation hooks (may replace the arguments)
//! 2. access check, unless overridden (may deny or add a constraint)
//! 3. merge the caller filter with the access constraint
//! 4. validate the caller's paths, then sanitize the merged filter
//! 5. delegate to the [`DatabaseAdapter`]
//! 6. after-operation hooks (may replace the result)
//!
//! Any error in these steps rolls back the request transaction before it is
//! returned. Operations never commit.

mod count;
mod count_versions;

pub use count::count_operation;
pub use count_versions::count_versions_operation;

use vellum_core::{kill_transaction, RequestContext};
use vellum_data::{
    combine_queries, sanitize_where_query, validate_query_paths, CountQuery, DatabaseAdapter,
    FieldSchema, TotalDocs, Where,
};

use crate::access::{execute_access, AccessArgs, AccessResult, AccessRule};
use crate::config::Collection;
use crate::error::OperationError;
use crate::hooks::{run_after_operation, run_before_operation, Operation};

/// Arguments of `count` and `countVersions`.
#[derive(Debug, Clone)]
pub struct CountArgs {
    pub collection: Collection,
    pub ctx: RequestContext,
    /// Resolve a denial to zero instead of an error.
    pub disable_errors: bool,
    /// Skip collection and field access checks.
    pub override_access: bool,
    /// `None` matches everything.
    pub filter: Option<Where>,
}

impl CountArgs {
    pub fn new(collection: Collection, ctx: RequestContext) -> Self {
        Self {
            collection,
            ctx,
            disable_errors: false,
            override_access: false,
            filter: None,
        }
    }

    pub fn disable_errors(mut self, disable: bool) -> Self {
        self.disable_errors = disable;
        self
    }

    pub fn override_access(mut self, override_access: bool) -> Self {
        self.override_access = override_access;
        self
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Per-operation choices plugged into the shared pipeline.
trait CountTarget {
    const OPERATION: Operation;

    fn access_rule(collection: &Collection) -> Option<&AccessRule>;

    fn schema(collection: &Collection) -> FieldSchema;

    fn delegate<A: DatabaseAdapter>(
        db: &A,
        query: CountQuery,
    ) -> impl std::future::Future<Output = Result<TotalDocs, vellum_data::DataError>> + Send;
}

/// Run the pipeline for `T`, rolling back the request transaction on failure.
async fn guarded<T: CountTarget, A: DatabaseAdapter>(
    db: &A,
    mut args: CountArgs,
) -> Result<TotalDocs, OperationError> {
    match pipeline::<T, A>(db, &mut args).await {
        Ok(result) => Ok(result),
        Err(err) => {
            tracing::debug!(
                operation = %T::OPERATION,
                collection = %args.collection.slug(),
                error = %err,
                "operation failed"
            );
            kill_transaction(&args.ctx).await;
            Err(err)
        }
    }
}

async fn pipeline<T: CountTarget, A: DatabaseAdapter>(
    db: &A,
    args: &mut CountArgs,
) -> Result<TotalDocs, OperationError> {
    let hooks = args.collection.clone();
    run_before_operation(&hooks.config().hooks.before_operation, T::OPERATION, args).await?;

    let args = &*args;
    let collection = &args.collection;

    let mut constraint = None;
    if !args.override_access {
        let access = execute_access(
            T::access_rule(collection),
            AccessArgs {
                ctx: args.ctx.clone(),
                disable_errors: args.disable_errors,
            },
        )
        .await?;

        match access {
            AccessResult::Denied => {
                tracing::debug!(
                    operation = %T::OPERATION,
                    collection = %collection.slug(),
                    "access denied, returning empty result"
                );
                return Ok(TotalDocs::default());
            }
            AccessResult::Allowed => {}
            AccessResult::AllowedWithFilter(filter) => constraint = Some(filter),
        }
    }

    let filter = args.filter.clone().unwrap_or_default();
    let schema = T::schema(collection);
    // Unreadable paths must fail the same way whatever their type or value.
    validate_query_paths(&filter, &schema, &args.ctx, args.override_access)?;
    let full_filter = sanitize_where_query(combine_queries(filter, constraint), &schema)?;

    let result = T::delegate(
        db,
        CountQuery {
            collection: collection.slug().to_string(),
            ctx: args.ctx.clone(),
            filter: full_filter,
        },
    )
    .await?;

    let result = run_after_operation(
        &collection.config().hooks.after_operation,
        T::OPERATION,
        args,
        result,
    )
    .await?;

    tracing::debug!(
        operation = %T::OPERATION,
        collection = %collection.slug(),
        total_docs = result.total_docs,
        "operation complete"
    );
    Ok(result)
}
