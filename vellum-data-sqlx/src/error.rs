use vellum_data::DataError;

/// Maps driver failures onto the backend-neutral [`DataError`].
///
/// `DataError` lives in `vellum-data` and `sqlx::Error` in `sqlx`, so neither
/// crate can host the `From` impl; call sites go through
/// `map_err(SqlxErrorExt::into_data_error)` instead.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match self {
            // A COUNT always yields one row; none means the statement never ran.
            sqlx::Error::RowNotFound => DataError::NotFound("count query returned no row".into()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                tracing::warn!(error = %self, "database pool unavailable");
                DataError::database(self)
            }
            other => DataError::database(other),
        }
    }
}

/// Result of a call into the SQLx backend.
pub type SqlxResult<T> = Result<T, DataError>;
