//! Unified error type for the telemost-bridge workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across telemost crates.
#[derive(Debug, Error)]
pub enum TelemostError {
    /// The caller did not present a verified user identity.
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed request body or missing parameter.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The OAuth state was never issued or could not be decoded.
    #[error("invalid OAuth state")]
    InvalidState,

    /// The OAuth state exists but its 10-minute window has passed.
    #[error("OAuth state expired")]
    StateExpired,

    /// No stored token exists for the given user.
    #[error("token not found for user: {0}")]
    TokenNotFound(String),

    /// The stored token has expired and was removed.
    #[error("token expired for user: {0}")]
    TokenExpired(String),

    /// Required configuration values are missing.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The Telemost API answered with a structured error body.
    #[error("telemost API error: {error} - {message}")]
    Provider {
        status: u16,
        error: String,
        message: String,
    },

    /// The Telemost API answered with an error status and an unparseable body.
    #[error("failed to create meeting, status: {status}, body: {body}")]
    ProviderRaw { status: u16, body: String },

    /// Network or timeout failure talking to an external service.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body did not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Key-value persistence failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Randomness or other unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TelemostError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for TelemostError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl TelemostError {
    /// Returns `true` for failures of the meeting provider call itself.
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. }
                | Self::ProviderRaw { .. }
                | Self::Transport(_)
                | Self::MalformedResponse(_)
        )
    }

    /// Returns `true` when the OAuth state could not be redeemed.
    #[must_use]
    pub fn is_state_failure(&self) -> bool {
        matches!(self, Self::InvalidState | Self::StateExpired)
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TelemostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_provider() {
        let err = TelemostError::Provider {
            status: 403,
            error: "forbidden".into(),
            message: "no quota".into(),
        };
        assert_eq!(err.to_string(), "telemost API error: forbidden - no quota");
    }

    #[test]
    fn test_error_display_provider_raw() {
        let err = TelemostError::ProviderRaw {
            status: 502,
            body: "<html>bad gateway</html>".into(),
        };
        let s = err.to_string();
        assert!(s.contains("502"));
        assert!(s.contains("bad gateway"));
    }

    #[test]
    fn test_error_display_token_not_found() {
        let err = TelemostError::TokenNotFound("u1".into());
        assert!(err.to_string().contains("u1"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid {{{").unwrap_err();
        let err: TelemostError = json_err.into();
        assert!(matches!(err, TelemostError::Serialization(_)));
    }

    #[test]
    fn test_is_provider_failure() {
        assert!(TelemostError::Transport("timeout".into()).is_provider_failure());
        assert!(TelemostError::MalformedResponse("eof".into()).is_provider_failure());
        assert!(
            TelemostError::ProviderRaw {
                status: 500,
                body: String::new()
            }
            .is_provider_failure()
        );
        assert!(!TelemostError::Unauthorized.is_provider_failure());
        assert!(!TelemostError::Storage("disk".into()).is_provider_failure());
    }

    #[test]
    fn test_is_state_failure() {
        assert!(TelemostError::InvalidState.is_state_failure());
        assert!(TelemostError::StateExpired.is_state_failure());
        assert!(!TelemostError::TokenExpired("u".into()).is_state_failure());
    }
}
