//! Error types for the evaluation service.
//!
//! Every failure surfaces to the caller as a JSON body with an HTTP status;
//! nothing is recovered transparently.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::engine::EvalError;

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Write attempted without an authenticated user.
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed FEN input.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// Login with an unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration collided with an existing username or email.
    #[error("{0}")]
    Conflict(&'static str),

    /// The evaluator failed on a well-formed position.
    #[error("failed to evaluate chess position")]
    EvaluationFailed,

    /// Storage read or write failed; propagated, never retried.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(&'static str),
}

/// Result type alias for request handlers and the evaluation service.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<EvalError> for ApiError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::InvalidPosition(msg) => ApiError::InvalidPosition(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InvalidPosition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::EvaluationFailed | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
