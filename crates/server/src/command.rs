//! Slash command dispatch: `/<trigger> start | connect | disconnect | help`.
//!
//! Every branch answers with a [`CommandResponse`]; failures become
//! ephemeral text rather than errors.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use telemost_config::Config;
use telemost_types::TelemostError;

use crate::{AppState, error::ApiError, extract::UserId, meetings::DEFAULT_MEETING_TITLE};

/// Props `type` for the in-channel meeting card.
pub const MEETING_POST_TYPE: &str = "custom_telemost_meeting";

/// A command invocation as delivered by the chat server.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandArgs {
    /// Full command line including the trigger, e.g. `/telemost start`.
    pub command: String,
    /// Must match the identity header when present in the body.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Ephemeral,
    InChannel,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub response_type: ResponseType,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
}

impl CommandResponse {
    fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
            props: None,
        }
    }
}

/// `POST /command`. The caller is the identity header, never the body.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Result<Json<CommandArgs>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(mut args) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if !args.user_id.is_empty() && args.user_id != user_id {
        tracing::warn!(user_id = %user_id, body_user_id = %args.user_id, "command user mismatch");
        return Err(ApiError(TelemostError::Unauthorized));
    }
    args.user_id = user_id;
    Ok(Json(execute(&state, &args).await))
}

/// Run one command line.
pub async fn execute(state: &AppState, args: &CommandArgs) -> CommandResponse {
    let config = state.config.load_full();
    let action = args
        .command
        .split_whitespace()
        .nth(1)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match action.as_str() {
        "" | "help" => CommandResponse::ephemeral(help_text(&config.command_trigger)),
        "start" => start(state, &config, args).await,
        "connect" => connect(state, &config, args).await,
        "disconnect" => disconnect(state, &config, args).await,
        _ => CommandResponse::ephemeral(format!("Unknown command: {}", args.command)),
    }
}

fn help_text(trigger: &str) -> String {
    format!(
        "**Telemost commands**\n\
         * `/{trigger} start` - Start a new Telemost meeting\n\
         * `/{trigger} connect` - Connect your Telemost account\n\
         * `/{trigger} disconnect` - Disconnect your Telemost account\n\
         * `/{trigger} help` - Show this help"
    )
}

async fn start(state: &AppState, config: &Config, args: &CommandArgs) -> CommandResponse {
    let user_id = args.user_id.as_str();
    let token = match state.sessions.get_valid_token(user_id).await {
        Ok(token) => token,
        Err(TelemostError::TokenNotFound(_) | TelemostError::TokenExpired(_)) => {
            return CommandResponse::ephemeral(format!(
                "You are not authenticated with Telemost. Use `/{} connect` to connect your account.",
                config.command_trigger
            ));
        }
        Err(TelemostError::Serialization(e)) => {
            tracing::warn!(user_id, error = %e, "stored token unreadable");
            return CommandResponse::ephemeral(format!(
                "Authentication error! Please reconnect with `/{} connect`.",
                config.command_trigger
            ));
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "failed to load user token");
            return CommandResponse::ephemeral("Failed to check your Telemost connection.");
        }
    };

    let meeting = match state
        .telemost(config)
        .create_meeting_with_defaults(&token.access_token, config, DEFAULT_MEETING_TITLE, "", &[])
        .await
    {
        Ok(meeting) => meeting,
        Err(e) => {
            tracing::error!(user_id, channel_id = %args.channel_id, error = %e, "failed to create meeting");
            return CommandResponse::ephemeral(format!("Failed to create meeting: {e}"));
        }
    };

    tracing::info!(user_id, channel_id = %args.channel_id, meeting_id = %meeting.id, "meeting started");

    let mut props = json!({
        "type": MEETING_POST_TYPE,
        "joinURL": meeting.join_url,
        "meetingID": meeting.id,
        "title": DEFAULT_MEETING_TITLE,
    });
    let mut text = format!(
        "**{DEFAULT_MEETING_TITLE}**\nMeeting ID: {}\n[Join meeting]({})",
        meeting.id, meeting.join_url
    );
    if let Some(live) = &meeting.live_stream {
        props["watchURL"] = Value::String(live.watch_url.clone());
        text.push_str(&format!("\n[Watch live stream]({})", live.watch_url));
    }

    CommandResponse {
        response_type: ResponseType::InChannel,
        text,
        props: Some(props),
    }
}

async fn connect(state: &AppState, config: &Config, args: &CommandArgs) -> CommandResponse {
    if state.sessions.is_authenticated(&args.user_id).await {
        return CommandResponse::ephemeral(format!(
            "You are already connected to Telemost. Use `/{} disconnect` to disconnect.",
            config.command_trigger
        ));
    }
    CommandResponse::ephemeral(format!(
        "[Click here to connect your Telemost account]({})",
        connect_link(config, &args.channel_id)
    ))
}

/// `<site_url><plugin_path>/oauth/start?channel_id=..`.
fn connect_link(config: &Config, channel_id: &str) -> String {
    let query = serde_urlencoded::to_string([("channel_id", channel_id)]).unwrap_or_default();
    format!("{}/oauth/start?{query}", config.plugin_url())
}

async fn disconnect(state: &AppState, config: &Config, args: &CommandArgs) -> CommandResponse {
    match state.sessions.disconnect(&args.user_id).await {
        Ok(()) => CommandResponse::ephemeral("Disconnected from Telemost."),
        Err(TelemostError::TokenNotFound(_)) => CommandResponse::ephemeral(format!(
            "You are not authenticated with Telemost. Use `/{} connect` to connect your account.",
            config.command_trigger
        )),
        Err(e) => {
            tracing::error!(user_id = %args.user_id, error = %e, "failed to disconnect");
            CommandResponse::ephemeral("Failed to disconnect from Telemost.")
        }
    }
}
