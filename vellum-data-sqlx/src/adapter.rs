use sqlx::{Database, Pool};
use vellum_data::{
    collection_table, versions_table, BindValue, CountQuery, DataError, DatabaseAdapter, Dialect,
    IdentifierPolicy, QueryBuilder, TotalDocs,
};

/// [`DatabaseAdapter`] over an `sqlx::Pool<DB>`.
///
/// Documents of a collection live in table `<slug>`, their versions in
/// `_<slug>_v`. Counts run inside the request's [`SqlxTransaction`](crate::SqlxTransaction)
/// when one is attached to the context, otherwise directly on the pool.
///
/// # Example
///
/// ```ignore
/// let adapter = SqlxAdapter::<Sqlite>::new(pool.clone());
/// let total = adapter.count_versions(CountQuery { collection: "posts".into(), ctx, filter }).await?;
/// ```
pub struct SqlxAdapter<DB: Database> {
    pool: Pool<DB>,
}

impl<DB: Database> SqlxAdapter<DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<DB: Database> Clone for SqlxAdapter<DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

fn to_total(count: i64) -> Result<TotalDocs, DataError> {
    u64::try_from(count)
        .map(TotalDocs::new)
        .map_err(|_| DataError::Other(format!("negative count: {count}")))
}

macro_rules! impl_database_adapter {
    ($feature:literal, $db:ty, $dialect:expr) => {
        #[cfg(feature = $feature)]
        impl SqlxAdapter<$db> {
            async fn run_count(&self, table: String, query: CountQuery) -> Result<TotalDocs, DataError> {
                use crate::error::SqlxErrorExt;
                use crate::tx::SqlxTransaction;

                let (sql, params) = QueryBuilder::new_with_dialect(&table, $dialect)
                    .identifier_policy(IdentifierPolicy::Quote)
                    .filter(query.filter)
                    .build_count()?;
                tracing::debug!(collection = %query.collection, sql = %sql, "count");

                let mut stmt = sqlx::query_scalar::<_, i64>(&sql);
                for param in params {
                    stmt = match param {
                        BindValue::Text(v) => stmt.bind(v),
                        BindValue::Integer(v) => stmt.bind(v),
                        BindValue::Float(v) => stmt.bind(v),
                        BindValue::Bool(v) => stmt.bind(v),
                    };
                }

                let handle = query.ctx.transaction().await;
                let tx = handle
                    .as_deref()
                    .and_then(|h| h.as_any().downcast_ref::<SqlxTransaction<$db>>());

                let count = match tx {
                    Some(tx) => {
                        let mut guard = tx.lock().await;
                        let Some(inner) = guard.as_mut() else {
                            return Err(DataError::Other(
                                "request transaction is already finished".into(),
                            ));
                        };
                        stmt.fetch_one(&mut **inner).await
                    }
                    None => stmt.fetch_one(&self.pool).await,
                }
                .map_err(SqlxErrorExt::into_data_error)?;

                to_total(count)
            }
        }

        #[cfg(feature = $feature)]
        impl DatabaseAdapter for SqlxAdapter<$db> {
            async fn count(&self, query: CountQuery) -> Result<TotalDocs, DataError> {
                let table = collection_table(&query.collection);
                self.run_count(table, query).await
            }

            async fn count_versions(&self, query: CountQuery) -> Result<TotalDocs, DataError> {
                let table = versions_table(&query.collection);
                self.run_count(table, query).await
            }
        }
    };
}

impl_database_adapter!("sqlite", sqlx::Sqlite, Dialect::Sqlite);
impl_database_adapter!("postgres", sqlx::Postgres, Dialect::Postgres);
