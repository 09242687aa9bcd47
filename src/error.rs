//! Crate-wide error taxonomy (spec §7): Validation, Authorization, State,
//! Gateway, Rate, Connection. `AppError` is the one vocabulary shared by
//! the HTTP surface (`IntoResponse`) and the realtime surface
//! (`to_ws_error`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::{ErrorCode, ServerEvent};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("music service error: {0}")]
    Gateway(GatewayError),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A gateway-side 429 is reclassified into the shared `RateLimited` variant
/// rather than `Gateway`, so both the external service's rate limit and the
/// local `loadPlaylist` cooldown share one error class and one `429`/
/// `RateLimited` code end to end (spec §7's Rate taxonomy entry).
impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RateLimited { retry_after_secs } => AppError::RateLimited { retry_after_secs },
            other => AppError::Gateway(other),
        }
    }
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::Validation,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::InvalidState(_) => ErrorCode::InvalidState,
            AppError::Gateway(_) => ErrorCode::Gateway,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
        }
    }

    /// Convert into the unicast `error` event sent back to the offending
    /// connection. Never broadcast.
    pub fn to_ws_event(&self) -> ServerEvent {
        ServerEvent::error_with_code(self.to_string(), self.code())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
