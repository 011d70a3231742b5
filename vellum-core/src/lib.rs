pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod identity;
pub mod layers;
pub mod prelude;
pub mod transaction;
pub mod types;
pub mod validation;

pub use config::{
    ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver, FromConfigValue,
    SecretResolver, VellumConfig,
};
pub use context::{CurrentIdentity, RequestContext};
pub use error::HttpError;
pub use identity::{Identity, NoIdentity};
pub use layers::{catch_panic_layer, default_trace, init_tracing};
pub use transaction::{kill_transaction, BoxError, TransactionHandle};
pub use types::{ApiResult, JsonResult};
pub use validation::{FieldError, ValidationErrorResponse};
