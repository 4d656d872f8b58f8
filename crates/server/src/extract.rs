//! Caller identity taken from the header set by the upstream chat server.

use axum::{extract::FromRequestParts, http::request::Parts};
use telemost_types::TelemostError;

use crate::error::ApiError;

/// Header carrying the already-verified user ID.
pub const USER_ID_HEADER: &str = "Mattermost-User-Id";

/// The authenticated caller. Rejects with 401 when the header is missing or blank.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
            .ok_or(ApiError(TelemostError::Unauthorized))
    }
}
