//! Persisted OAuth records: the pending authorization state and the per-user token.

use serde::{Deserialize, Serialize};

/// How long an issued OAuth state may be redeemed (10 minutes).
pub const OAUTH_STATE_TTL_SECS: u64 = 10 * 60;

/// Fixed lifetime assigned to every user token (24 hours).
///
/// The implicit grant fragment carries its own `expires_in`, which is ignored.
pub const USER_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Binds an authorization request to the user and channel that started it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    pub user_id: String,
    pub channel_id: String,
    /// Unix seconds after which the state can no longer be redeemed.
    pub expires_at: u64,
}

impl OAuthState {
    /// Create a state issued at `now`, valid for [`OAUTH_STATE_TTL_SECS`].
    pub fn issue(user_id: impl Into<String>, channel_id: impl Into<String>, now: u64) -> Self {
        Self {
            user_id: user_id.into(),
            channel_id: channel_id.into(),
            expires_at: now + OAUTH_STATE_TTL_SECS,
        }
    }

    /// Strictly after `expires_at`; the boundary second itself is still valid.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

/// A user's Telemost access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub access_token: String,
    /// Unix seconds after which the token is discarded on read.
    pub expires_at: u64,
    pub user_id: String,
}

impl UserToken {
    /// Create a token issued at `now`, valid for [`USER_TOKEN_TTL_SECS`].
    pub fn issue(access_token: impl Into<String>, user_id: impl Into<String>, now: u64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: now + USER_TOKEN_TTL_SECS,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}
