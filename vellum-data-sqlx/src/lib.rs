//! # vellum-data-sqlx: SQLx backend for the Vellum data layer
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxAdapter`] | [`DatabaseAdapter`](vellum_data::DatabaseAdapter) over an `sqlx::Pool<DB>` |
//! | [`SqlxTransaction`] | Request-scoped transaction, attachable to a `RequestContext` |
//! | [`SqlxErrorExt`] | Maps `sqlx::Error` onto `DataError` |
//! | [`SqlxResult<T>`] | `Result<T, DataError>` for backend calls |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` (default) |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//!
//! # Error bridging
//!
//! Driver errors surface as [`DataError`](vellum_data::DataError) through
//! [`SqlxErrorExt`]. An empty result maps to `NotFound`; everything else
//! becomes `Database` with the `sqlx::Error` kept as its source:
//!
//! ```ignore
//! use vellum_data_sqlx::SqlxErrorExt;
//!
//! let tx = pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;
//! ```

pub mod adapter;
pub mod error;
pub mod tx;

pub use adapter::SqlxAdapter;
pub use error::{SqlxErrorExt, SqlxResult};
pub use tx::SqlxTransaction;

/// Re-exports of the most commonly used types from both `vellum-data` and this crate.
pub mod prelude {
    pub use crate::{SqlxAdapter, SqlxErrorExt, SqlxTransaction};
    pub use vellum_data::prelude::*;
}
