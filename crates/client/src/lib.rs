//! Telemost REST client: conference creation.
//!
//! A pure request/response mapper. It never touches persisted state; callers
//! hand it a bearer token and a configuration snapshot.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use telemost_config::Config;
use telemost_types::{
    Cohost, LiveStreamRequest, Meeting, MeetingRequest, ProviderErrorBody, TelemostError,
    traits::Result,
};

/// Hard limit for a single call to the Telemost API. No retries.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Telemost API base URL.
#[derive(Clone)]
pub struct TelemostClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl TelemostClient {
    /// Creates a client for `base_url` sharing the given connection pool.
    #[must_use]
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Creates a client for the base URL in `config`.
    #[must_use]
    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(http, config.api_base_url.as_str())
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `POST {base}/conferences` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// - [`TelemostError::Transport`] on network failure or timeout.
    /// - [`TelemostError::MalformedResponse`] if a 201 body is not a meeting.
    /// - [`TelemostError::Provider`] for a structured error body.
    /// - [`TelemostError::ProviderRaw`] for any other non-201 answer.
    pub async fn create_meeting(&self, token: &str, request: &MeetingRequest) -> Result<Meeting> {
        let url = format!("{}/conferences", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("OAuth {token}"))
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .inspect_err(|e| tracing::error!(url = %url, error = %e, "telemost request failed"))?;

        let status = resp.status();
        let body = resp.bytes().await?;
        classify_response(status, &body)
    }

    /// Build a request from configuration defaults and delegate to
    /// [`Self::create_meeting`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_meeting`].
    pub async fn create_meeting_with_defaults(
        &self,
        token: &str,
        config: &Config,
        title: &str,
        description: &str,
        cohosts: &[String],
    ) -> Result<Meeting> {
        let request = build_request(config, title, description, cohosts);
        self.create_meeting(token, &request).await
    }
}

/// Derive a [`MeetingRequest`] from the configuration snapshot.
///
/// The live-stream block is present only when live streaming is enabled.
#[must_use]
pub fn build_request(
    config: &Config,
    title: &str,
    description: &str,
    cohosts: &[String],
) -> MeetingRequest {
    let live_stream = config.enable_live_stream.then(|| LiveStreamRequest {
        access_level: config.default_live_stream_access_level.clone(),
        title: title.to_string(),
        description: description.to_string(),
    });
    MeetingRequest {
        waiting_room_level: config.default_waiting_room_level.clone(),
        live_stream,
        cohosts: cohosts
            .iter()
            .map(|email| Cohost {
                email: email.clone(),
            })
            .collect(),
    }
}

fn classify_response(status: StatusCode, body: &[u8]) -> Result<Meeting> {
    if status == StatusCode::CREATED {
        return serde_json::from_slice(body).map_err(|e| {
            tracing::error!(error = %e, "telemost returned an unreadable meeting");
            TelemostError::MalformedResponse(e.to_string())
        });
    }

    let status = status.as_u16();
    match serde_json::from_slice::<ProviderErrorBody>(body) {
        Ok(err) if !err.error.is_empty() || !err.message.is_empty() => {
            tracing::warn!(status, error = %err.error, message = %err.message, "telemost API error");
            Err(TelemostError::Provider {
                status,
                error: err.error,
                message: err.message,
            })
        }
        _ => {
            let body = String::from_utf8_lossy(body).into_owned();
            tracing::warn!(status, body = %body, "telemost API error with unstructured body");
            Err(TelemostError::ProviderRaw { status, body })
        }
    }
}
