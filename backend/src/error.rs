use crate::database::DatabaseError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error;
use tracing::error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (pool, schema bootstrap)
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Row store errors that have no user-facing meaning
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Actor is not allowed to touch the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique-key clash or illegal state transition
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            match &self {
                AppError::Validation(msg)
                | AppError::NotFound(msg)
                | AppError::Forbidden(msg)
                | AppError::Conflict(msg) => msg.clone(),
                other => other.to_string(),
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

/// Row store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Unique key violation
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Foreign key or check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Table or column name that cannot be used as an identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Invalid input (empty update, unfiltered delete, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Row could not be mapped to or from its record type
    #[error("Row decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            StoreError::ConstraintViolation(msg) => AppError::Validation(msg),
            other => AppError::Store(other),
        }
    }
}

impl From<SqlxError> for StoreError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique violation
                    Some("23505") => StoreError::Duplicate(db_err.message().to_string()),
                    // Foreign key violation, check constraint violation
                    Some("23503") | Some("23514") => {
                        StoreError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => StoreError::Query(err),
                }
            }
            _ => StoreError::Query(err),
        }
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}

/// Reject missing or blank required fields with a 400
pub fn require_field<'a>(value: Option<&'a str>, field: &str) -> AppResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Store(StoreError::InvalidInput("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let err: AppError = StoreError::Duplicate("users_email_key".into()).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = StoreError::ConstraintViolation("fk".into()).into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = StoreError::InvalidIdentifier("bad name".into()).into();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[test]
    fn test_require_field() {
        assert_eq!(require_field(Some(" a "), "name").unwrap(), "a");
        assert!(require_field(Some("   "), "name").is_err());
        assert!(require_field(None, "name").is_err());
    }

    #[test]
    fn test_option_to_result() {
        assert!(option_to_result(Some(1), "missing").is_ok());
        assert!(option_to_result::<i32>(None, "missing").unwrap_err().is_not_found());
    }
}
