//! # vellum-collections: collection operations
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`CollectionConfig`] and the shared [`Collection`] handle |
//! | [`access`] | Access rules returning [`AccessResult`] and the default rule |
//! | [`hooks`] | Before/after-operation hook chains |
//! | [`operations`] | [`count_operation`] and [`count_versions_operation`] |
//!
//! # Quick start
//!
//! ```ignore
//! use vellum_collections::prelude::*;
//!
//! let posts = CollectionConfig::new("posts")
//!     .fields(vec![Field::text("title")])
//!     .versions(VersionsConfig::with_drafts(false))
//!     .build();
//!
//! let total = count_versions_operation(&adapter, CountArgs::new(posts, ctx)).await?;
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod hooks;
pub mod operations;

pub use access::{execute_access, Access, AccessArgs, AccessResult, AccessRule};
pub use config::{Collection, CollectionAccess, CollectionConfig};
pub use error::OperationError;
pub use hooks::{
    after_operation, before_operation, AfterOperation, AfterOperationArgs, AfterOperationHook,
    BeforeOperation, BeforeOperationArgs, BeforeOperationHook, CollectionHooks, Operation,
};
pub use operations::{count_operation, count_versions_operation, CountArgs};

pub mod prelude {
    //! Re-exports of the most commonly used collection types.
    pub use crate::access;
    pub use crate::{
        after_operation, before_operation, count_operation, count_versions_operation, AccessArgs,
        AccessResult, Collection, CollectionConfig, CountArgs, OperationError,
    };
    pub use vellum_data::{Field, Operator, TotalDocs, VersionsConfig, Where};
}
