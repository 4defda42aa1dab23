//! Error type shared by every layer of the directory.
//!
//! Each failure surfaces as one of a closed set of kinds. Callers map them to
//! their own presentation; nothing here is retried or swallowed.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed required fields on create/update.
    #[error("validation error: {message}")]
    Validation { message: String, details: Value },

    /// The id does not resolve to a non-deleted site.
    #[error("not found: {message}")]
    NotFound { message: String, details: Value },

    /// A lifecycle transition that the site's current state does not allow.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String, details: Value },

    /// Caller passed an argument that can never produce a meaningful query.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String, details: Value },

    /// Opaque passthrough from the storage layer.
    #[error("storage failure: {message}")]
    Storage {
        message: String,
        details: Value,
        #[source]
        source: Option<sqlx::Error>,
    },
}

/// Serializable view of an error, for admin output.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn invariant(message: impl Into<String>, details: Value) -> Self {
        Self::InvariantViolation {
            message: message.into(),
            details,
        }
    }
    pub fn invalid_argument(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
            source: None,
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::InvariantViolation { .. } => "invariant_violation",
            AppError::InvalidArgument { .. } => "invalid_argument",
            AppError::Storage { .. } => "storage_failure",
        }
    }

    pub fn info(&self) -> ErrorInfo {
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::InvariantViolation { message, details }
            | AppError::InvalidArgument { message, details }
            | AppError::Storage {
                message, details, ..
            } => (message.clone(), details.clone()),
        };

        ErrorInfo {
            code: self.code(),
            message,
            details,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(e, sqlx::Error::RowNotFound) {
            return AppError::not_found("Row not found", json!({}));
        }

        let details = match e.as_database_error() {
            Some(db) => json!({ "code": db.code(), "constraint": db.constraint() }),
            None => json!({}),
        };

        AppError::Storage {
            message: "Database error".to_string(),
            details,
            source: Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::validation("x", json!({})).code(),
            "validation_error"
        );
        assert_eq!(AppError::not_found("x", json!({})).code(), "not_found");
        assert_eq!(
            AppError::invariant("x", json!({})).code(),
            "invariant_violation"
        );
        assert_eq!(
            AppError::invalid_argument("x", json!({})).code(),
            "invalid_argument"
        );
        assert_eq!(AppError::storage("x", json!({})).code(), "storage_failure");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_other_sqlx_errors_map_to_storage() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Storage { source: Some(_), .. }));
    }

    #[test]
    fn test_info_carries_details() {
        let info = AppError::not_found("Site not found", json!({"id": 7})).info();
        assert_eq!(info.code, "not_found");
        assert_eq!(info.message, "Site not found");
        assert_eq!(info.details["id"], 7);
    }
}
