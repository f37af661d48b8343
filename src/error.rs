use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;

use crate::validation::FieldErrors;

/// Every failure a store, the hire coordinator or a handler can report.
///
/// Business-rule variants carry a human readable reason that is returned to the
/// client as-is. Infrastructure variants are logged and replaced by a generic
/// message before they leave the process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{reason}")]
    Forbidden {
        reason: String,
        field: Option<&'static str>,
    },

    #[error("{reason}")]
    Conflict {
        reason: String,
        field: Option<&'static str>,
    },

    #[error("validation failed")]
    Validation(FieldErrors),

    /// The store aborted a multi-record write. Nothing was applied; the whole
    /// request may be re-issued.
    #[error("transaction aborted: {0}")]
    TransactionAborted(DbErr),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl AppError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            field: None,
        }
    }

    /// A forbidden action reported against a single request field.
    pub fn forbidden_on(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            field: Some(field),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
            field: None,
        }
    }

    /// A state or uniqueness conflict reported against a single request field.
    pub fn conflict_on(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
            field: Some(field),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), reason.into());
        Self::Validation(errors)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Field-scoped errors, if this error is reported against request fields.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::Forbidden {
                reason,
                field: Some(field),
            }
            | Self::Conflict {
                reason,
                field: Some(field),
            } => {
                let mut errors = FieldErrors::new();
                errors.insert(field.to_string(), reason.clone());
                Some(errors)
            }
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        if self.field_errors().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::TransactionAborted(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let Some(errors) = self.field_errors() {
            return HttpResponse::build(status).json(serde_json::json!({
                "error": "Validation failed",
                "errors": errors,
            }));
        }

        let message = match self {
            Self::TransactionAborted(e) => {
                tracing::error!(error = %e, "transaction aborted");
                "The request could not be completed, please retry".to_string()
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}
