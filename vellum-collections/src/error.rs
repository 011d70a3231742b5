use vellum_core::HttpError;
use vellum_data::{DataError, QueryError};

/// Errors raised by collection operations.
#[derive(Debug)]
pub enum OperationError {
    /// Access was denied and errors were not suppressed.
    Forbidden(String),
    /// The filter failed sanitization or path validation.
    Query(QueryError),
    /// The database adapter failed.
    Data(DataError),
    /// A before/after-operation hook or an access rule failed.
    Hook(String),
}

impl OperationError {
    pub fn forbidden() -> Self {
        OperationError::Forbidden("You are not allowed to perform this action.".into())
    }

    /// Wrap any error raised by user code running inside the pipeline.
    pub fn hook(err: impl std::fmt::Display) -> Self {
        OperationError::Hook(err.to_string())
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            OperationError::Query(err) => write!(f, "{err}"),
            OperationError::Data(err) => write!(f, "{err}"),
            OperationError::Hook(msg) => write!(f, "Hook error: {msg}"),
        }
    }
}

impl std::error::Error for OperationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OperationError::Query(err) => Some(err),
            OperationError::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for OperationError {
    fn from(err: QueryError) -> Self {
        OperationError::Query(err)
    }
}

impl From<DataError> for OperationError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Query(err) => OperationError::Query(err),
            other => OperationError::Data(other),
        }
    }
}

impl From<OperationError> for HttpError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Forbidden(msg) => HttpError::Forbidden(msg),
            OperationError::Query(err) => err.into(),
            OperationError::Data(err) => err.into(),
            OperationError::Hook(msg) => HttpError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::http::StatusCode;

    #[test]
    fn maps_to_http_status() {
        let cases = [
            (OperationError::forbidden(), StatusCode::FORBIDDEN),
            (
                OperationError::Query(QueryError::InvalidPaths(vec!["x".into()])),
                StatusCode::BAD_REQUEST,
            ),
            (
                OperationError::Data(DataError::NotFound("posts".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                OperationError::Data(DataError::Other("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (OperationError::hook("bad hook"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status(), status);
        }
    }

    #[test]
    fn query_errors_inside_data_errors_stay_client_errors() {
        let err = OperationError::from(DataError::Query(QueryError::UnknownPath("x".into())));
        assert!(matches!(err, OperationError::Query(_)));
    }
}
