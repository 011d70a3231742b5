//! Vellum core prelude: the types most handlers and operations touch.

pub use crate::config::{ConfigError, ConfigProperties, VellumConfig};
pub use crate::context::{CurrentIdentity, RequestContext};
pub use crate::error::HttpError;
pub use crate::http::{Json, Router, StatusCode};
pub use crate::identity::Identity;
pub use crate::transaction::{kill_transaction, TransactionHandle};
pub use crate::types::{ApiResult, JsonResult};
