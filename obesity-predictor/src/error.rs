//! Error types for obesity-predictor
//!
//! API errors render as `{"error": {"code", "message"}}` JSON bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use obesity_common::Error as CommonError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or out-of-domain field (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Model artifact missing or corrupt (503)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// obesity-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::ModelUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(err) => match err {
                CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
                CommonError::ModelUnavailable(msg) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE", msg)
                }
                CommonError::Inference(msg) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INFERENCE_ERROR", msg)
                }
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    other.to_string(),
                ),
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
