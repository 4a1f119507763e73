//! Error handling module
//!
//! Defines error types and handling logic used in the project

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Upstream API answered with a non-success status
    #[error("External API error ({status}): {message}")]
    ExternalApi { status: u16, message: String },

    /// Upstream API answered successfully but the body is unusable
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Upstream request timed out
    #[error("Upstream request timed out")]
    Timeout,

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AppError::Timeout
        } else {
            AppError::HttpClient(error)
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    /// Status reported by the upstream API, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl AppError {
    /// Get HTTP status code
    ///
    /// Every variant is a server-side failure from the caller's point of view.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ExternalApi { .. } | AppError::InvalidResponse(_) | AppError::HttpClient(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Config(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::ExternalApi { .. } => "upstream_error",
            AppError::InvalidResponse(_) => "invalid_upstream_response",
            AppError::HttpClient(_) => "upstream_unreachable",
            AppError::Timeout => "timeout_error",
            AppError::Config(_) => "configuration_error",
            AppError::Serialization(_) | AppError::Internal(_) => "internal_error",
        }
    }

    /// Build the JSON error body
    pub fn to_error_response(&self) -> ErrorResponse {
        let upstream_status = match self {
            AppError::ExternalApi { status, .. } => Some(*status),
            _ => None,
        };

        ErrorResponse {
            error: ErrorBody {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
                upstream_status,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        tracing::error!("Application error: {} - Status code: {}", self, status);

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
