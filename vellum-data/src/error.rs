use crate::filter::Operator;
use crate::fields::FieldType;

/// Errors raised while parsing, sanitizing, validating, or compiling a `Where`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The JSON shape is not a valid `Where` object.
    MalformedWhere(String),
    /// An operator name that is not recognised.
    InvalidOperator(String),
    /// A filter path that does not exist in the schema.
    UnknownPath(String),
    /// The operator cannot be applied to the field's type.
    OperatorNotAllowed {
        path: String,
        operator: Operator,
        field_type: FieldType,
    },
    /// The value cannot be coerced to what the field and operator expect.
    InvalidValue {
        path: String,
        operator: Operator,
        reason: String,
    },
    /// Paths rejected by query-path validation.
    InvalidPaths(Vec<String>),
    /// A table or column name that is not a safe SQL identifier.
    InvalidIdentifier { kind: &'static str, ident: String },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::MalformedWhere(msg) => write!(f, "Malformed where: {msg}"),
            QueryError::InvalidOperator(op) => write!(f, "Invalid operator: {op}"),
            QueryError::UnknownPath(path) => write!(f, "Unknown query path: {path}"),
            QueryError::OperatorNotAllowed {
                path,
                operator,
                field_type,
            } => write!(
                f,
                "Operator `{operator}` is not allowed on {field_type:?} field `{path}`"
            ),
            QueryError::InvalidValue {
                path,
                operator,
                reason,
            } => write!(f, "Invalid value for `{path}` ({operator}): {reason}"),
            QueryError::InvalidPaths(paths) => {
                write!(f, "The following paths cannot be queried: {}", paths.join(", "))
            }
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    Query(QueryError),
    Database(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `vellum-data-sqlx`) to wrap driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Query(err) => write!(f, "Query error: {err}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            DataError::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::Query(err)
    }
}

impl From<QueryError> for vellum_core::HttpError {
    fn from(err: QueryError) -> Self {
        vellum_core::HttpError::BadRequest(err.to_string())
    }
}

impl From<DataError> for vellum_core::HttpError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => vellum_core::HttpError::NotFound(msg),
            DataError::Query(e) => e.into(),
            DataError::Database(e) => vellum_core::HttpError::Internal(e.to_string()),
            DataError::Other(msg) => vellum_core::HttpError::Internal(msg),
        }
    }
}
