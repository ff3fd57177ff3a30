//! Error types for Facility Desk.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error type for Facility Desk operations.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DeskError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DeskError::Conflict("A record with the same key already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return DeskError::Conflict(
                    "The record is referenced by or refers to another record".to_string(),
                );
            }
        }
        DeskError::Database(err)
    }
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DeskError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            DeskError::NotFound(_) => StatusCode::NOT_FOUND,
            DeskError::BadRequest(_) | DeskError::Serialization(_) | DeskError::Import(_) => {
                StatusCode::BAD_REQUEST
            }
            DeskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DeskError::Forbidden(_) => StatusCode::FORBIDDEN,
            DeskError::Conflict(_) => StatusCode::CONFLICT,
            DeskError::Database(_) | DeskError::Config(_) | DeskError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DeskError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match &self {
            DeskError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            DeskError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None),
            DeskError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone(), None),
            DeskError::Forbidden(msg) => ("FORBIDDEN", msg.clone(), None),
            DeskError::Conflict(msg) => ("CONFLICT", msg.clone(), None),
            DeskError::Database(e) => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %e, "Database error");
                ("DATABASE_ERROR", "A database error occurred".to_string(), None)
            }
            DeskError::Config(msg) => (
                "CONFIG_ERROR",
                "Configuration error".to_string(),
                Some(msg.clone()),
            ),
            DeskError::Serialization(e) => (
                "SERIALIZATION_ERROR",
                "Failed to process request/response".to_string(),
                Some(e.to_string()),
            ),
            DeskError::Import(msg) => ("IMPORT_ERROR", msg.clone(), None),
            DeskError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("INTERNAL_ERROR", "An internal error occurred".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for Facility Desk operations.
pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DeskError::Forbidden("no".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DeskError::BadRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DeskError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DeskError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
