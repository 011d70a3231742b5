#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use vellum_core::{BoxError, Identity, RequestContext, TransactionHandle};
use vellum_data::{CountQuery, DataError, DatabaseAdapter, TotalDocs};

pub struct User {
    pub sub: String,
    pub roles: Vec<String>,
}

impl User {
    pub fn new(sub: &str, roles: &[&str]) -> Self {
        Self {
            sub: sub.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl Identity for User {
    fn sub(&self) -> &str {
        &self.sub
    }

    fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// Transaction handle counting rollbacks.
#[derive(Default)]
pub struct CountingTx {
    pub rollbacks: AtomicUsize,
    pub fail: bool,
}

impl CountingTx {
    pub fn failing() -> Self {
        Self {
            rollbacks: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

impl TransactionHandle for CountingTx {
    fn id(&self) -> &str {
        "tx-test"
    }

    fn rollback(&self) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(async move {
            self.rollbacks.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("connection reset".into());
            }
            Ok(())
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Adapter recording every call and answering with a fixed total.
#[derive(Default)]
pub struct MockAdapter {
    pub total: u64,
    pub fail: bool,
    pub calls: Mutex<Vec<(&'static str, CountQuery)>>,
}

impl MockAdapter {
    pub fn returning(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(&'static str, CountQuery)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, query: CountQuery) -> Result<TotalDocs, DataError> {
        self.calls.lock().unwrap().push((method, query));
        if self.fail {
            return Err(DataError::Other("database unavailable".into()));
        }
        Ok(TotalDocs::new(self.total))
    }
}

impl DatabaseAdapter for MockAdapter {
    async fn count(&self, query: CountQuery) -> Result<TotalDocs, DataError> {
        self.record("count", query)
    }

    async fn count_versions(&self, query: CountQuery) -> Result<TotalDocs, DataError> {
        self.record("count_versions", query)
    }
}

/// Shared, ordered log of events for hook assertions.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub fn ctx_with_tx(tx: &Arc<CountingTx>) -> RequestContext {
    let handle: Arc<dyn TransactionHandle> = tx.clone();
    RequestContext::new()
        .with_identity(User::new("u1", &["editor"]))
        .with_transaction(handle)
}
