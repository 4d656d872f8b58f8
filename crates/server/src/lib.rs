//! HTTP surface of the bridge: axum router, route handlers, command dispatch
//! and error mapping.
//!
//! Paths are relative to the plugin mount point; the binary nests the router
//! under `plugin_path`.

pub mod assets;
pub mod command;
mod error;
mod extract;
mod meetings;
mod oauth;
pub mod poster;

pub use assets::DirAssets;
pub use command::{CommandArgs, CommandResponse, ResponseType};
pub use error::ApiError;
pub use extract::{USER_ID_HEADER, UserId};
pub use poster::{ConfiguredPoster, LogPoster, WebhookPoster};

use arc_swap::ArcSwap;
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use std::sync::Arc;
use telemost_auth::SessionManager;
use telemost_client::TelemostClient;
use telemost_config::Config;
use telemost_types::AssetSource;
use tower_http::trace::TraceLayer;

/// Shared application state passed to all route handlers.
pub struct AppState {
    /// Current configuration snapshot register.
    pub config: Arc<ArcSwap<Config>>,
    /// OAuth state and token lifecycle.
    pub sessions: Arc<SessionManager>,
    /// Connection pool for calls to the Telemost API.
    pub http: reqwest::Client,
    /// Bundled static files.
    pub assets: Arc<dyn AssetSource>,
}

impl AppState {
    /// Creates a new shared application state wrapped in an `Arc`.
    pub fn new(
        config: Arc<ArcSwap<Config>>,
        sessions: Arc<SessionManager>,
        assets: Arc<dyn AssetSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions,
            http: reqwest::Client::new(),
            assets,
        })
    }

    /// Meeting client bound to the API base URL of `config`.
    pub(crate) fn telemost(&self, config: &Config) -> TelemostClient {
        TelemostClient::from_config(self.http.clone(), config)
    }
}

/// Build the full axum router.
///
/// Routes:
/// - GET  /oauth/start?channel_id=..   307 to the Yandex authorization page
/// - GET  /oauth/callback              fragment-extraction page
/// - POST /oauth/complete              `{access_token, state}`
/// - POST /api/v1/meetings             `{title, description, cohosts}`
/// - GET  /assets/{name}               static files
/// - POST /command                     slash command dispatch
/// - GET  /healthz                     liveness, answered even when unconfigured
pub fn make_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/oauth/start", get(oauth::start))
        .route("/oauth/callback", get(oauth::callback))
        .route("/oauth/complete", post(oauth::complete))
        .route("/api/v1/meetings", post(meetings::create))
        .route("/assets/{name}", get(assets::serve))
        .route("/command", post(command::handle))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_configured,
        ))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Mount `router` under `plugin_path`, or at the root when the path is empty.
pub fn mount(router: Router, plugin_path: &str) -> Router {
    let path = plugin_path.trim_end_matches('/');
    if path.is_empty() {
        router
    } else {
        Router::new().nest(path, router)
    }
}

async fn require_configured(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.config.load().is_valid()?;
    Ok(next.run(req).await)
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use telemost_store::InMemoryKvStore;
    use telemost_types::{ChannelPoster, TelemostError, traits::Result};

    /// Asset source over a fixed map that counts read attempts.
    #[derive(Default)]
    pub struct CountingAssets {
        pub files: HashMap<String, Vec<u8>>,
        pub reads: AtomicUsize,
    }

    impl CountingAssets {
        pub fn with(name: &str, bytes: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(name.to_string(), bytes.to_vec());
            Self {
                files,
                reads: AtomicUsize::new(0),
            }
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssetSource for CountingAssets {
        async fn read(&self, name: &str) -> Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| TelemostError::Storage(format!("no asset {name}")))
        }
    }

    #[derive(Default)]
    pub struct RecordingPoster {
        pub posts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChannelPoster for RecordingPoster {
        async fn post(&self, channel_id: &str, _user_id: &str, message: &str) -> Result<()> {
            self.posts
                .lock()
                .unwrap()
                .push((channel_id.to_string(), message.to_string()));
            Ok(())
        }
    }

    pub fn config(api_base_url: &str) -> Config {
        Config {
            client_id: "yandex-client".into(),
            site_url: "https://chat.example.com".into(),
            api_base_url: api_base_url.into(),
            ..Config::default()
        }
    }

    pub struct Harness {
        pub state: Arc<AppState>,
        pub store: Arc<InMemoryKvStore>,
        pub poster: Arc<RecordingPoster>,
        pub assets: Arc<CountingAssets>,
    }

    pub fn harness_with(config: Config, assets: CountingAssets) -> Harness {
        let poster = Arc::new(RecordingPoster::default());
        let assets = Arc::new(assets);
        let store = Arc::new(InMemoryKvStore::new());
        let sessions = Arc::new(SessionManager::new(store.clone(), poster.clone()));
        let state = AppState::new(
            Arc::new(ArcSwap::from_pointee(config)),
            sessions,
            assets.clone(),
        );
        Harness {
            state,
            store,
            poster,
            assets,
        }
    }

    pub fn harness(config: Config) -> Harness {
        harness_with(config, CountingAssets::default())
    }

    /// Run the OAuth start/complete pair so `user_id` holds `token`.
    pub async fn connect(state: &AppState, user_id: &str, token: &str) {
        let config = state.config.load_full();
        let url = state
            .sessions
            .start_authorization(&config, user_id, "town-square")
            .await
            .unwrap();
        let state_param = url.split("state=").nth(1).unwrap().to_string();
        state
            .sessions
            .complete_authorization(token, &state_param)
            .await
            .unwrap();
    }
}
