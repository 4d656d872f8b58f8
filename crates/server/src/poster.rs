//! [`ChannelPoster`] implementations.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use telemost_config::Config;
use telemost_types::{ChannelPoster, traits::Result};

/// Writes channel messages to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPoster;

#[async_trait]
impl ChannelPoster for LogPoster {
    async fn post(&self, channel_id: &str, user_id: &str, message: &str) -> Result<()> {
        tracing::info!(channel_id, user_id, message, "channel post");
        Ok(())
    }
}

/// Posts channel messages to an incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookPoster {
    http: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    channel_id: &'a str,
    text: &'a str,
}

impl WebhookPoster {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChannelPoster for WebhookPoster {
    async fn post(&self, channel_id: &str, user_id: &str, message: &str) -> Result<()> {
        self.http
            .post(&self.url)
            .json(&WebhookPayload {
                channel_id,
                text: message,
            })
            .send()
            .await?
            .error_for_status()
            .inspect_err(|e| tracing::warn!(channel_id, user_id, error = %e, "webhook rejected post"))?;
        Ok(())
    }
}

/// Picks the webhook from the current configuration on every post and
/// falls back to [`LogPoster`] when none is set.
pub struct ConfiguredPoster {
    config: Arc<ArcSwap<Config>>,
    http: reqwest::Client,
}

impl ConfiguredPoster {
    pub fn new(config: Arc<ArcSwap<Config>>, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl ChannelPoster for ConfiguredPoster {
    async fn post(&self, channel_id: &str, user_id: &str, message: &str) -> Result<()> {
        let config = self.config.load_full();
        match config.notify_webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                WebhookPoster::new(self.http.clone(), url)
                    .post(channel_id, user_id, message)
                    .await
            }
            _ => LogPoster.post(channel_id, user_id, message).await,
        }
    }
}
