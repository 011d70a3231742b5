//! Request-scoped SQLx transaction handle.
//!
//! [`SqlxTransaction`] owns an open `sqlx::Transaction` behind a mutex so it
//! can be shared through a [`RequestContext`](vellum_core::RequestContext)
//! as an `Arc<dyn TransactionHandle>`. The request owner commits it on
//! success; operations roll it back through `kill_transaction` on failure.
//!
//! ```ignore
//! let tx = SqlxTransaction::begin(&pool).await?;
//! let ctx = RequestContext::new().with_transaction(tx.clone());
//! let total = count_versions_operation(&adapter, args(ctx)).await?;
//! tx.commit().await?;
//! ```

use std::any::Any;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use sqlx::{Database, Pool, Transaction};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;
use vellum_core::{BoxError, TransactionHandle};

use crate::error::{SqlxErrorExt, SqlxResult};

pub struct SqlxTransaction<DB: Database> {
    id: String,
    inner: Mutex<Option<Transaction<'static, DB>>>,
}

impl<DB: Database> SqlxTransaction<DB> {
    /// Begin a transaction on `pool`.
    pub async fn begin(pool: &Pool<DB>) -> SqlxResult<Arc<Self>> {
        let tx = pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;
        let id = Uuid::new_v4().to_string();
        tracing::debug!(transaction = %id, "transaction started");
        Ok(Arc::new(Self {
            id,
            inner: Mutex::new(Some(tx)),
        }))
    }

    /// Commit the transaction. A finished transaction commits as a no-op.
    pub async fn commit(&self) -> SqlxResult<()> {
        let tx = self.inner.lock().await.take();
        if let Some(tx) = tx {
            tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;
            tracing::debug!(transaction = %self.id, "transaction committed");
        }
        Ok(())
    }

    /// `false` once committed or rolled back.
    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    /// Lock the underlying transaction to run queries on it.
    /// `None` inside the guard means the transaction is finished.
    pub async fn lock(&self) -> MutexGuard<'_, Option<Transaction<'static, DB>>> {
        self.inner.lock().await
    }
}

impl<DB: Database> TransactionHandle for SqlxTransaction<DB> {
    fn id(&self) -> &str {
        &self.id
    }

    fn rollback(&self) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(async move {
            let tx = self.inner.lock().await.take();
            if let Some(tx) = tx {
                tx.rollback().await?;
            }
            Ok(())
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
