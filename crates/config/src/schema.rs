use serde::{Deserialize, Serialize};
use telemost_types::TelemostError;

/// Prefix for environment overrides, e.g. `TELEMOST_CLIENT_ID`.
pub const ENV_PREFIX: &str = "TELEMOST_";

fn default_port() -> u16 {
    8018
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_waiting_room_level() -> String {
    "PUBLIC".to_string()
}
fn default_live_stream_access_level() -> String {
    "PUBLIC".to_string()
}
fn default_api_base_url() -> String {
    "https://cloud-api.yandex.net/v1/telemost-api".to_string()
}
fn default_authorize_url() -> String {
    "https://oauth.yandex.ru/authorize".to_string()
}
fn default_plugin_path() -> String {
    "/plugins/com.mattermost.plugin-telemost".to_string()
}
fn default_assets_dir() -> String {
    "assets".to_string()
}
fn default_command_trigger() -> String {
    "telemost".to_string()
}

/// Top-level bridge configuration.
///
/// A published `Config` is never mutated; changes build a new value and
/// swap it in through [`crate::ConfigWatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (defaults to 8018).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen address (defaults to `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Service-wide Telemost token used by the HTTP meetings API when the
    /// caller has not connected their own account.
    #[serde(default)]
    pub oauth_token: Option<String>,
    /// Yandex OAuth application client ID.
    #[serde(default)]
    pub client_id: String,
    /// Public base URL of the chat server, e.g. `https://chat.example.com`.
    #[serde(default)]
    pub site_url: String,
    #[serde(default = "default_waiting_room_level")]
    pub default_waiting_room_level: String,
    #[serde(default)]
    pub enable_live_stream: bool,
    #[serde(default = "default_live_stream_access_level")]
    pub default_live_stream_access_level: String,
    /// Telemost REST base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Yandex OAuth authorization endpoint.
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    /// Mount point of the bridge under `site_url`.
    #[serde(default = "default_plugin_path")]
    pub plugin_path: String,
    /// Directory holding files served under `/assets/`.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Incoming-webhook URL used to post notifications into channels.
    #[serde(default)]
    pub notify_webhook_url: Option<String>,
    /// Slash command trigger word.
    #[serde(default = "default_command_trigger")]
    pub command_trigger: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            oauth_token: None,
            client_id: String::new(),
            site_url: String::new(),
            default_waiting_room_level: default_waiting_room_level(),
            enable_live_stream: false,
            default_live_stream_access_level: default_live_stream_access_level(),
            api_base_url: default_api_base_url(),
            authorize_url: default_authorize_url(),
            plugin_path: default_plugin_path(),
            assets_dir: default_assets_dir(),
            notify_webhook_url: None,
            command_trigger: default_command_trigger(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults and then
    /// `TELEMOST_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    /// Loads defaults plus `TELEMOST_*` environment overrides, without a file.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if an environment value has the wrong type.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Serialized},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    /// Checks that the fields required for the OAuth flow are set.
    ///
    /// # Errors
    ///
    /// Returns [`TelemostError::NotConfigured`] naming the first missing field.
    pub fn is_valid(&self) -> Result<(), TelemostError> {
        if self.client_id.trim().is_empty() {
            return Err(TelemostError::NotConfigured(
                "must have a Yandex Client ID".into(),
            ));
        }
        if self.site_url.trim().is_empty() {
            return Err(TelemostError::NotConfigured("must have a Site URL".into()));
        }
        Ok(())
    }

    /// `site_url` + `plugin_path` without a trailing slash.
    #[must_use]
    pub fn plugin_url(&self) -> String {
        format!(
            "{}{}",
            self.site_url.trim_end_matches('/'),
            self.plugin_path.trim_end_matches('/')
        )
    }

    /// Where the provider sends the browser after authorization.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/oauth/callback", self.plugin_url())
    }

    /// The service-wide token, if one is configured and non-empty.
    #[must_use]
    pub fn service_token(&self) -> Option<&str> {
        self.oauth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
port: 9000
host: "0.0.0.0"
client_id: "yandex-client"
site_url: "https://chat.example.com/"
enable_live_stream: true
default_waiting_room_level: "ORGANIZATION"
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.port, 8018);
        assert_eq!(c.host, "127.0.0.1");
        assert_eq!(c.default_waiting_room_level, "PUBLIC");
        assert!(!c.enable_live_stream);
        assert!(c.oauth_token.is_none());
    }

    #[test]
    fn test_from_yaml_fields() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.client_id, "yandex-client");
        assert!(c.enable_live_stream);
        assert_eq!(c.default_waiting_room_level, "ORGANIZATION");
    }

    #[test]
    fn test_from_yaml_defaults_applied() {
        let c = Config::from_yaml("port: 1234").unwrap();
        assert_eq!(c.port, 1234);
        assert_eq!(c.host, "127.0.0.1");
        assert_eq!(c.command_trigger, "telemost");
    }

    #[test]
    fn test_is_valid_requires_client_id_and_site_url() {
        let c = Config::default();
        let err = c.is_valid().unwrap_err();
        assert!(err.to_string().contains("Client ID"));

        let c = Config::from_yaml("client_id: abc").unwrap();
        let err = c.is_valid().unwrap_err();
        assert!(err.to_string().contains("Site URL"));

        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert!(c.is_valid().is_ok());
    }

    #[test]
    fn test_redirect_uri_trims_slashes() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(
            c.oauth_redirect_uri(),
            "https://chat.example.com/plugins/com.mattermost.plugin-telemost/oauth/callback"
        );
    }

    #[test]
    fn test_service_token_ignores_blank() {
        let c = Config::from_yaml("oauth_token: '  '").unwrap();
        assert!(c.service_token().is_none());
        let c = Config::from_yaml("oauth_token: svc").unwrap();
        assert_eq!(c.service_token(), Some("svc"));
    }
}
