//! Request body validation backed by `garde`.

use serde::Serialize;

/// A field-level validation error.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Container for validation errors, used as the payload of `HttpError::Validation`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

impl ValidationErrorResponse {
    /// Names of the offending fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

/// Run `garde` validation on a deserialized body.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct Body {
///     #[garde(length(min = 1))]
///     filename: String,
/// }
///
/// let body: Body = serde_json::from_slice(&bytes)?;
/// vellum_core::validation::validate(&body)?;
/// ```
pub fn validate<T>(value: &T) -> Result<(), ValidationErrorResponse>
where
    T: garde::Validate,
    T::Context: Default,
{
    value.validate().map_err(|report| convert_garde_report(&report))
}

fn convert_garde_report(report: &garde::Report) -> ValidationErrorResponse {
    let errors = report
        .iter()
        .map(|(path, error)| {
            let field = {
                let s = path.to_string();
                if s.is_empty() { "value".to_string() } else { s }
            };
            FieldError {
                field,
                message: error.message().to_string(),
                code: "validation".to_string(),
            }
        })
        .collect();

    ValidationErrorResponse { errors }
}

// Re-export garde::Validate for convenience.
pub use garde::Validate;
