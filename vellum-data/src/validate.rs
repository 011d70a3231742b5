use vellum_core::RequestContext;

use crate::error::QueryError;
use crate::fields::FieldSchema;
use crate::filter::Where;

/// Check that every path in `filter` may be queried by `ctx`.
///
/// Unknown and hidden paths are always rejected. Paths crossing a field whose
/// read access denies `ctx` are rejected unless `override_access` is set.
/// All offending paths are reported together, in first-seen order.
pub fn validate_query_paths(
    filter: &Where,
    schema: &FieldSchema,
    ctx: &RequestContext,
    override_access: bool,
) -> Result<(), QueryError> {
    let mut invalid: Vec<String> = Vec::new();

    for path in filter.paths() {
        let allowed = match schema.resolve(path) {
            None => false,
            Some(resolved) if resolved.is_hidden() => false,
            Some(resolved) => override_access || resolved.is_readable(ctx),
        };
        if !allowed && !invalid.iter().any(|p| p == path) {
            invalid.push(path.to_string());
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        tracing::debug!(paths = ?invalid, "rejected query paths");
        Err(QueryError::InvalidPaths(invalid))
    }
}
