//! Error types for the circulation desk

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::repository::GatewayError;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Whether repeating the request later may succeed
    pub retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, retryable) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "Authentication", msg.clone(), false)
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "Validation", msg.clone(), false),
            AppError::Gateway(e) => {
                tracing::error!("Backend error: {}", e);
                if e.is_transient() {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Backend",
                        "Backend temporarily unavailable".to_string(),
                        true,
                    )
                } else {
                    (
                        StatusCode::BAD_GATEWAY,
                        "Backend",
                        "Backend request failed".to_string(),
                        false,
                    )
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal",
                    "Internal server error".to_string(),
                    false,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            retryable,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
