//! Vellum: a headless content-management core.
//!
//! This facade crate re-exports the Vellum sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use vellum::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature      | Default | Crate                        |
//! |--------------|---------|------------------------------|
//! | `storage-s3` | **yes** | `vellum-storage-s3`          |
//! | `data-sqlx`  | no      | `vellum-data-sqlx`           |
//! | `sqlite`     | no      | `vellum-data-sqlx/sqlite`    |
//! | `postgres`   | no      | `vellum-data-sqlx/postgres`  |
//! | `full`       | no      | All of the above             |
//!
//! `vellum-data` and `vellum-collections` are always available.

pub extern crate vellum_core;

// Re-export everything from vellum-core at the top level for convenience.
pub use vellum_core::*;

pub use vellum_collections;
pub use vellum_data;

#[cfg(feature = "data-sqlx")]
pub use vellum_data_sqlx;

#[cfg(feature = "storage-s3")]
pub use vellum_storage_s3;

/// Unified prelude: import everything with `use vellum::prelude::*`.
///
/// Includes the core prelude plus types from all enabled feature crates.
pub mod prelude {
    pub use vellum_collections::prelude::*;
    pub use vellum_core::prelude::*;
    pub use vellum_data::prelude::*;

    #[cfg(feature = "data-sqlx")]
    pub use vellum_data_sqlx::prelude::*;

    #[cfg(feature = "storage-s3")]
    pub use vellum_storage_s3::prelude::*;
}
