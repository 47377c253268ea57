//! Error handling for the Acopio stock ledger
//!
//! Business-rule rejections are not errors: the ledger reports them in its
//! result types. `AppError` covers request validation at the HTTP edge,
//! storage failures and internal invariant violations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt record in collection '{collection}': {source}")]
    CorruptRecord {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::CorruptRecord { .. } => "CORRUPT_RECORD",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::InvariantViolation(_) => "INVARIANT_VIOLATION",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: self.code().to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: self.code().to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: self.code().to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::Storage(_) | AppError::CorruptRecord { .. } | AppError::DatabaseError(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: self.code().to_string(),
                    message: "The inventory store could not be read or written".to_string(),
                    field: None,
                },
            ),
            AppError::Serialization(_) | AppError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: self.code().to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::InvariantViolation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: self.code().to_string(),
                    message: format!("Ledger requires manual reconciliation: {}", msg),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;
