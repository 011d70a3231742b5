//! Convenience type aliases for common handler return types.

use crate::error::HttpError;
use crate::http::Json;

/// Flexible result alias: any response type with [`HttpError`].
pub type ApiResult<T> = Result<T, HttpError>;

/// The most common handler return type: `Result<Json<T>, HttpError>`.
///
/// ```ignore
/// async fn count(State(app): State<App>, ctx: RequestContext) -> JsonResult<TotalDocs> {
///     Ok(Json(count_versions_operation(&app.db, args).await?))
/// }
/// ```
pub type JsonResult<T> = Result<Json<T>, HttpError>;
