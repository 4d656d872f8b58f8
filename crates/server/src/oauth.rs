//! `/oauth/*` handlers for the Yandex implicit-grant flow.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::{Html, Redirect},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use telemost_auth::{CompleteRequest, render_callback_page};

use crate::{AppState, error::ApiError, extract::UserId};

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    #[serde(default)]
    channel_id: String,
}

/// `GET /oauth/start?channel_id=..`: issue a state and redirect to Yandex.
pub async fn start(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Query(query): Query<StartQuery>,
) -> Result<Redirect, ApiError> {
    if query.channel_id.trim().is_empty() {
        return Err(ApiError::bad_request("channel_id is required"));
    }
    let config = state.config.load_full();
    let url = state
        .sessions
        .start_authorization(&config, &user_id, &query.channel_id)
        .await?;
    Ok(Redirect::temporary(&url))
}

/// `GET /oauth/callback`: the page that lifts the token out of the fragment.
pub async fn callback(State(state): State<Arc<AppState>>) -> Html<String> {
    let config = state.config.load();
    let complete_url = format!(
        "{}/oauth/complete",
        config.plugin_path.trim_end_matches('/')
    );
    Html(render_callback_page(&config.site_url, &complete_url))
}

/// `POST /oauth/complete`: redeem the state and store the token.
pub async fn complete(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompleteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    state
        .sessions
        .complete_authorization(&req.access_token, &req.state)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "OAuth token stored successfully",
    })))
}
