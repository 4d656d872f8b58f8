//! Owner of the OAuth state and user token lifecycles.
//!
//! Per user: `Unauthenticated → start → PendingState → complete →
//! Authenticated → (expiry | disconnect) → Unauthenticated`. Both expiries
//! are checked lazily on read; nothing sweeps the store in the background.
use std::sync::Arc;
use telemost_config::Config;
use telemost_types::{
    ChannelPoster, Clock, KvStore, OAuthState, SystemClock, TelemostError, UserToken,
    traits::Result,
};

use crate::{state, yandex};

/// Key prefix for pending OAuth states.
pub const OAUTH_STATE_KEY_PREFIX: &str = "telemost_oauth_state_";
/// Key prefix for per-user tokens.
pub const USER_TOKEN_KEY_PREFIX: &str = "telemost_user_token_";

/// Message posted into the originating channel once a user has connected.
pub const CONNECTED_MESSAGE: &str = "✅ **Connected to Telemost**\n\n\
    Your Telemost authentication has been connected. Use `/telemost start` to create a meeting.";

#[must_use]
pub fn state_key(state: &str) -> String {
    format!("{OAUTH_STATE_KEY_PREFIX}{state}")
}

#[must_use]
pub fn token_key(user_id: &str) -> String {
    format!("{USER_TOKEN_KEY_PREFIX}{user_id}")
}

pub struct SessionManager {
    store: Arc<dyn KvStore>,
    poster: Arc<dyn ChannelPoster>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KvStore>, poster: Arc<dyn ChannelPoster>) -> Self {
        Self {
            store,
            poster,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for all expiry decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issue a new state for `(user_id, channel_id)` and return the provider
    /// authorization URL carrying it.
    ///
    /// # Errors
    ///
    /// Returns [`TelemostError::Internal`] if randomness fails, or a storage
    /// error if the state cannot be persisted.
    pub async fn start_authorization(
        &self,
        config: &Config,
        user_id: &str,
        channel_id: &str,
    ) -> Result<String> {
        let state = state::random_state()?;
        let record = OAuthState::issue(user_id, channel_id, self.clock.now());
        let json = serde_json::to_vec(&record)?;

        self.store
            .set(&state_key(&state), &json)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id, channel_id, error = %e, "failed to store OAuth state");
            })?;

        tracing::info!(user_id, channel_id, "OAuth flow started");
        yandex::build_auth_url(config, &state)
    }

    /// Redeem `state` and store `access_token` for the user that started the flow.
    ///
    /// Deleting the used state and posting the confirmation are best-effort:
    /// their failures are logged and do not fail the call.
    ///
    /// # Errors
    ///
    /// - [`TelemostError::BadRequest`] if `access_token` or `state` is empty.
    /// - [`TelemostError::InvalidState`] if the state was never issued or is unreadable.
    /// - [`TelemostError::StateExpired`] if the 10-minute window has passed.
    /// - A storage error if the token cannot be persisted.
    pub async fn complete_authorization(
        &self,
        access_token: &str,
        state: &str,
    ) -> Result<OAuthState> {
        if access_token.is_empty() || state.is_empty() {
            return Err(TelemostError::BadRequest(
                "access_token and state are required".into(),
            ));
        }

        let key = state_key(state);
        let raw = self
            .store
            .get(&key)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to read OAuth state"))?
            .ok_or(TelemostError::InvalidState)?;

        let pending: OAuthState = serde_json::from_slice(&raw).map_err(|e| {
            tracing::error!(error = %e, "failed to decode OAuth state");
            TelemostError::InvalidState
        })?;

        let now = self.clock.now();
        if pending.is_expired(now) {
            tracing::warn!(user_id = %pending.user_id, "OAuth state expired");
            return Err(TelemostError::StateExpired);
        }

        let token = UserToken::issue(access_token, &pending.user_id, now);
        let json = serde_json::to_vec(&token)?;
        self.store
            .set(&token_key(&pending.user_id), &json)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id = %pending.user_id, error = %e, "failed to store user token");
            })?;

        if let Err(e) = self.store.delete(&key).await {
            tracing::warn!(error = %e, "failed to delete used OAuth state");
        }

        if let Err(e) = self
            .poster
            .post(&pending.channel_id, &pending.user_id, CONNECTED_MESSAGE)
            .await
        {
            tracing::warn!(
                channel_id = %pending.channel_id,
                user_id = %pending.user_id,
                error = %e,
                "failed to post connection notice"
            );
        }

        tracing::info!(user_id = %pending.user_id, "Telemost account connected");
        Ok(pending)
    }

    /// Fetch the user's token, discarding it if it has expired.
    ///
    /// # Errors
    ///
    /// - [`TelemostError::TokenNotFound`] if no token is stored.
    /// - [`TelemostError::TokenExpired`] if it expired (it is deleted first).
    /// - A storage or serialization error otherwise.
    pub async fn get_valid_token(&self, user_id: &str) -> Result<UserToken> {
        let key = token_key(user_id);
        let raw = self
            .store
            .get(&key)
            .await
            .inspect_err(|e| tracing::error!(user_id, error = %e, "failed to read user token"))?
            .ok_or_else(|| TelemostError::TokenNotFound(user_id.to_string()))?;

        let token: UserToken = serde_json::from_slice(&raw).inspect_err(|e| {
            tracing::error!(user_id, error = %e, "failed to decode user token");
        })?;

        if token.is_expired(self.clock.now()) {
            if let Err(e) = self.store.delete(&key).await {
                tracing::warn!(user_id, error = %e, "failed to delete expired token");
            }
            tracing::info!(user_id, "user token expired");
            return Err(TelemostError::TokenExpired(user_id.to_string()));
        }

        Ok(token)
    }

    /// `true` if the user currently holds a valid token.
    pub async fn is_authenticated(&self, user_id: &str) -> bool {
        self.get_valid_token(user_id).await.is_ok()
    }

    /// Remove the user's token.
    ///
    /// # Errors
    ///
    /// Returns [`TelemostError::TokenNotFound`] if there was nothing to remove,
    /// or a storage error.
    pub async fn disconnect(&self, user_id: &str) -> Result<()> {
        let removed = self
            .store
            .delete(&token_key(user_id))
            .await
            .inspect_err(|e| tracing::error!(user_id, error = %e, "failed to delete user token"))?;
        if removed {
            tracing::info!(user_id, "Telemost account disconnected");
            Ok(())
        } else {
            Err(TelemostError::TokenNotFound(user_id.to_string()))
        }
    }
}
