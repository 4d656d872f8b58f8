//! API error type that maps [`TelemostError`] variants to HTTP status codes.
//!
//! Provider, storage and internal failures are answered with a generic
//! message; the detail only goes to the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use telemost_types::TelemostError;

/// Wrapper around [`TelemostError`] that implements [`IntoResponse`].
#[derive(Debug)]
pub struct ApiError(pub TelemostError);

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(TelemostError::BadRequest(msg.into()))
    }

    /// Returns `(status, error_code, public_message)` for the wrapped error.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match &self.0 {
            TelemostError::Unauthorized
            | TelemostError::TokenNotFound(_)
            | TelemostError::TokenExpired(_) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "User not authenticated".into(),
            ),
            TelemostError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            TelemostError::InvalidState => (
                StatusCode::BAD_REQUEST,
                "invalid_state",
                "Invalid or expired OAuth state".into(),
            ),
            TelemostError::StateExpired => (
                StatusCode::BAD_REQUEST,
                "invalid_state",
                "OAuth state expired".into(),
            ),
            TelemostError::NotConfigured(_) => (
                StatusCode::FORBIDDEN,
                "not_configured",
                "This plugin is not configured.".into(),
            ),
            TelemostError::Provider { .. }
            | TelemostError::ProviderRaw { .. }
            | TelemostError::Transport(_)
            | TelemostError::MalformedResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "provider_error",
                "Failed to create meeting".into(),
            ),
            TelemostError::Storage(_)
            | TelemostError::Serialization(_)
            | TelemostError::Config(_)
            | TelemostError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code, "request failed");
        } else {
            tracing::debug!(error = %self.0, code, "request rejected");
        }
        (
            status,
            Json(json!({
                "error": {
                    "message": message,
                    "code": code,
                }
            })),
        )
            .into_response()
    }
}

impl From<TelemostError> for ApiError {
    fn from(e: TelemostError) -> Self {
        Self(e)
    }
}
