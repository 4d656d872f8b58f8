use crate::schema::Config;
use arc_swap::ArcSwap;
use std::{path::PathBuf, sync::Arc};

/// Single-writer / multi-reader register for the active [`Config`].
///
/// Readers get an `Arc` to an immutable snapshot. A change never edits the
/// current value; it publishes a complete replacement.
pub struct ConfigWatcher {
    current: Arc<ArcSwap<Config>>,
    /// Backing file, if the configuration came from one.
    path: Option<PathBuf>,
}

impl ConfigWatcher {
    /// Loads `path` and remembers it for [`Self::reload`].
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the configuration file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn new(path: PathBuf) -> Result<Self, figment::Error> {
        let config = Config::from_file(&path)?;
        Ok(Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
            path: Some(path),
        })
    }

    /// Wraps an already-built configuration with no backing file.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
            path: None,
        }
    }

    #[must_use]
    pub fn load(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// The register itself, for handing to request handlers.
    #[must_use]
    pub fn arc(&self) -> Arc<ArcSwap<Config>> {
        Arc::clone(&self.current)
    }

    /// Publishes a new configuration. This is the configuration-change hook.
    pub fn replace(&self, config: Config) {
        self.current.store(Arc::new(config));
        tracing::info!("configuration replaced");
    }

    /// Re-reads the backing file and publishes the result.
    ///
    /// Without a backing file this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the configuration file cannot be read or parsed.
    /// The previous snapshot stays active in that case.
    #[allow(clippy::result_large_err)]
    pub fn reload(&self) -> Result<(), figment::Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let new_config = Config::from_file(path)?;
        self.replace(new_config);
        Ok(())
    }

    /// Starts background file watching (spawns a blocking tokio task) that
    /// reloads the configuration whenever the file changes.
    pub fn watch(self: Arc<Self>) {
        use notify::{RecursiveMode, Watcher as _};
        let Some(path) = self.path.clone() else {
            return;
        };
        let watcher_self = Arc::clone(&self);

        tokio::task::spawn_blocking(move || {
            let (tx, rx) = std::sync::mpsc::channel();
            let mut watcher =
                match notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                    if res.is_ok() {
                        let _ = tx.send(());
                    }
                }) {
                    Ok(w) => w,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to create config watcher");
                        return;
                    }
                };

            if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
                tracing::error!(path = %path.display(), error = %e, "failed to watch config file");
                return;
            }

            for () in rx {
                if let Err(e) = watcher_self.reload() {
                    tracing::warn!(error = %e, "config reload failed, keeping previous snapshot");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(path: &std::path::Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_initial_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemost.yaml");
        write_config(&path, "site_url: https://chat.example.com\n");
        let watcher = ConfigWatcher::new(path).unwrap();
        let config = watcher.load();
        assert_eq!(config.site_url, "https://chat.example.com");
        assert_eq!(config.command_trigger, "telemost");
    }

    #[test]
    fn test_reload_publishes_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        write_config(&path, "client_id: first\n");
        let watcher = ConfigWatcher::new(path.clone()).unwrap();
        assert_eq!(watcher.load().client_id, "first");

        write_config(&path, "client_id: second\n");
        watcher.reload().unwrap();
        assert_eq!(watcher.load().client_id, "second");
    }

    #[test]
    fn test_reload_failure_keeps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        write_config(&path, "port: 1111\n");
        let watcher = ConfigWatcher::new(path.clone()).unwrap();

        write_config(&path, "port: [not, a, number]\n");
        assert!(watcher.reload().is_err());
        assert_eq!(watcher.load().port, 1111);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let watcher = ConfigWatcher::from_config(Config::default());
        let before = watcher.load();

        watcher.replace(Config {
            enable_live_stream: true,
            ..Config::default()
        });

        assert!(!before.enable_live_stream);
        assert!(watcher.load().enable_live_stream);
    }

    #[test]
    fn test_handle_sees_replacement() {
        let watcher = ConfigWatcher::from_config(Config::default());
        let handle = watcher.arc();
        watcher.replace(Config {
            client_id: "replaced".into(),
            ..Config::default()
        });
        assert_eq!(handle.load().client_id, "replaced");
    }
}
