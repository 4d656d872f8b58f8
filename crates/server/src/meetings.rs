//! `POST /api/v1/meetings`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;
use telemost_types::{Meeting, TelemostError};

use crate::{AppState, error::ApiError, extract::UserId};

/// Title used when the caller does not supply one.
pub const DEFAULT_MEETING_TITLE: &str = "Telemost Meeting";

#[derive(Debug, Deserialize)]
pub struct CreateMeetingBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cohosts: Vec<String>,
}

/// Create a conference with the caller's token, or the service token when
/// the caller has none.
pub async fn create(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Result<Json<CreateMeetingBody>, JsonRejection>,
) -> Result<Json<Meeting>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let config = state.config.load_full();

    let token = match state.sessions.get_valid_token(&user_id).await {
        Ok(token) => token.access_token,
        Err(e @ (TelemostError::TokenNotFound(_) | TelemostError::TokenExpired(_))) => {
            match config.service_token() {
                Some(token) => {
                    tracing::debug!(user_id = %user_id, "using service token");
                    token.to_string()
                }
                None => return Err(e.into()),
            }
        }
        Err(e) => return Err(e.into()),
    };

    let title = if body.title.trim().is_empty() {
        DEFAULT_MEETING_TITLE
    } else {
        body.title.as_str()
    };

    let meeting = state
        .telemost(&config)
        .create_meeting_with_defaults(&token, &config, title, &body.description, &body.cohosts)
        .await?;

    tracing::info!(user_id = %user_id, meeting_id = %meeting.id, "meeting created");
    Ok(Json(meeting))
}
