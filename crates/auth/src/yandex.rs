//! Yandex OAuth implicit grant (`response_type=token`).
//!
//! The token comes back in the redirect URL fragment, so there is no
//! server-side code exchange and no refresh token.

use telemost_config::Config;
use telemost_types::{TelemostError, traits::Result};

/// Build the authorization URL the browser is redirected to.
///
/// # Errors
///
/// Returns [`TelemostError::Internal`] if the query string cannot be encoded.
pub fn build_auth_url(config: &Config, state: &str) -> Result<String> {
    let redirect_uri = config.oauth_redirect_uri();
    let query = serde_urlencoded::to_string([
        ("response_type", "token"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("state", state),
    ])
    .map_err(|e| TelemostError::Internal(format!("failed to encode authorize URL: {e}")))?;
    Ok(format!("{}?{query}", config.authorize_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            client_id: "cid-123".into(),
            site_url: "https://chat.example.com".into(),
            ..Config::default()
        }
    }

    #[test]
    fn test_auth_url_uses_implicit_grant() {
        let url = build_auth_url(&config(), "st4te").unwrap();
        assert!(url.starts_with("https://oauth.yandex.ru/authorize?"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("client_id=cid-123"));
        assert!(url.contains("state=st4te"));
    }

    #[test]
    fn test_auth_url_encodes_redirect_uri() {
        let url = build_auth_url(&config(), "s").unwrap();
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Fchat.example.com%2Fplugins%2Fcom.mattermost.plugin-telemost%2Foauth%2Fcallback"
        ));
    }
}
