use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use telemost_auth::SessionManager;
use telemost_config::{Config, ConfigWatcher};
use telemost_server::{AppState, ConfiguredPoster, DirAssets, LogPoster};
use telemost_store::SqliteKvStore;
use telemost_types::TelemostError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(
    name = "telemost-bridge",
    about = "telemost-bridge: Yandex Telemost meetings for your chat server"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Path to the YAML configuration file (falls back to TELEMOST_* variables).
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the listening port (default: 8018).
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the listening address (default: 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
        /// SQLite database path (default: ~/.telemost-bridge/kv.db).
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
        /// Emit logs as JSON lines.
        #[arg(long)]
        json_logs: bool,
    },
    /// Show whether a user has a valid Telemost token.
    Status {
        user_id: String,
        /// SQLite database path (default: ~/.telemost-bridge/kv.db).
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },
    /// Remove a user's stored Telemost token.
    Disconnect {
        user_id: String,
        /// SQLite database path (default: ~/.telemost-bridge/kv.db).
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            host,
            db,
            json_logs,
        } => {
            init_tracing(json_logs);
            cmd_serve(config, port, host, db).await
        }
        Commands::Status { user_id, db } => {
            init_tracing(false);
            cmd_status(&user_id, db).await
        }
        Commands::Disconnect { user_id, db } => {
            init_tracing(false);
            cmd_disconnect(&user_id, db).await
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
    db: Option<PathBuf>,
) -> Result<()> {
    let watcher = if let Some(path) = config_path {
        ConfigWatcher::new(path).map_err(|e| anyhow::anyhow!("config error: {e}"))?
    } else {
        ConfigWatcher::from_config(
            Config::from_env().map_err(|e| anyhow::anyhow!("config error: {e}"))?,
        )
    };
    let watcher = Arc::new(watcher);
    let config = watcher.load();
    if let Err(e) = config.is_valid() {
        tracing::warn!(error = %e, "configuration incomplete, routes will answer 403");
    }

    let poster = Arc::new(ConfiguredPoster::new(watcher.arc(), reqwest_client()));

    let sessions = Arc::new(SessionManager::new(Arc::new(open_store(db).await?), poster));
    let assets = Arc::new(DirAssets::new(&config.assets_dir));
    let state = AppState::new(watcher.arc(), sessions, assets);
    let app = telemost_server::mount(telemost_server::make_router(state), &config.plugin_path);

    Arc::clone(&watcher).watch();

    let addr = format!(
        "{}:{}",
        host.as_deref().unwrap_or(&config.host),
        port.unwrap_or(config.port)
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, plugin_path = %config.plugin_path, "telemost-bridge listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn cmd_status(user_id: &str, db: Option<PathBuf>) -> Result<()> {
    let sessions = SessionManager::new(Arc::new(open_store(db).await?), Arc::new(LogPoster));
    let status = if sessions.is_authenticated(user_id).await {
        "authenticated"
    } else {
        "not authenticated"
    };
    println!("{user_id}: {status}");
    Ok(())
}

async fn cmd_disconnect(user_id: &str, db: Option<PathBuf>) -> Result<()> {
    let sessions = SessionManager::new(Arc::new(open_store(db).await?), Arc::new(LogPoster));
    match sessions.disconnect(user_id).await {
        Ok(()) => println!("{user_id} disconnected"),
        Err(TelemostError::TokenNotFound(_)) => println!("{user_id} has no stored token"),
        Err(e) => return Err(anyhow::anyhow!("disconnect failed: {e}")),
    }
    Ok(())
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("telemost-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

async fn open_store(db: Option<PathBuf>) -> Result<SqliteKvStore> {
    let path = db.unwrap_or_else(default_db_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let url = format!("sqlite://{}", path.display());
    SqliteKvStore::new(&url)
        .await
        .map_err(|e| anyhow::anyhow!("database error: {e}"))
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".telemost-bridge").join("kv.db")
}
