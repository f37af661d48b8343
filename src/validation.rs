use actix_web::{HttpResponse, web};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Field name (as it appears in the JSON body) -> first failure message.
pub type FieldErrors = BTreeMap<String, String>;

/// Request bodies that are cleaned up before they are validated.
pub trait Normalize {
    fn normalize(self) -> Self;
}

/// Trim the input, validate it, and report every failing field at once.
pub fn validated<T: Normalize + Validate>(input: T) -> Result<T, AppError> {
    let input = input.normalize();
    input
        .validate()
        .map_err(|errors| AppError::Validation(field_errors(&errors)))?;
    Ok(input)
}

/// Flatten validator output into one message per field, keyed by JSON name.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let name = field.to_string();
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{name} is invalid"));
            (camel_case(&name), message)
        })
        .collect()
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Shared JSON extractor config: malformed bodies get the same JSON error shape
/// as every other failure instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let message = match &err {
                actix_web::error::JsonPayloadError::Deserialize(de) if de.is_eof() => {
                    "Request body is empty. Expected JSON payload".to_string()
                }
                actix_web::error::JsonPayloadError::Deserialize(de) => {
                    format!("Invalid JSON: {de}")
                }
                actix_web::error::JsonPayloadError::ContentType => {
                    "Content-Type must be application/json".to_string()
                }
                other => other.to_string(),
            };
            tracing::debug!(error = %err, "rejected request body");
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
            )
            .into()
        })
}
