//! # vellum-data: query model and storage contract
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`filter`] | The [`Where`] predicate tree, its JSON shape, and [`combine_queries`] |
//! | [`fields`] | Field schemas and [`build_version_collection_fields`] |
//! | [`sanitize`] | Operator/value normalization against a schema |
//! | [`validate`] | Path validation honouring hidden fields and field read access |
//! | [`sql`] | [`QueryBuilder`] compiling a `Where` into a parameterized `COUNT(*)` |
//! | [`adapter`] | The [`DatabaseAdapter`] contract implemented by storage backends |

pub mod adapter;
pub mod error;
pub mod fields;
pub mod filter;
pub mod sanitize;
pub mod sql;
pub mod validate;

pub use adapter::{CountQuery, DatabaseAdapter, TotalDocs};
pub use error::{DataError, QueryError};
pub use fields::{
    build_version_collection_fields, DraftsConfig, Field, FieldAccess, FieldSchema, FieldType,
    ResolvedPath, VersionsConfig,
};
pub use filter::{combine_queries, Condition, Operator, Where};
pub use sanitize::{allowed_operators, sanitize_where_query};
pub use sql::{
    collection_table, column_for_path, versions_table, BindValue, Dialect, IdentifierPolicy,
    QueryBuilder,
};
pub use validate::validate_query_paths;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        CountQuery, DataError, DatabaseAdapter, Field, FieldSchema, QueryError, TotalDocs, Where,
    };
}
