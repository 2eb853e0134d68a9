//! Polling watcher that republishes the configuration when its file changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use watchprice_core::types::WatchConfig;

use crate::load_config;

/// Polls the file's modification time and publishes every successfully
/// loaded revision. A revision that fails to load is logged and skipped, so
/// subscribers keep the last good configuration.
pub struct ConfigWatcher {
    path: PathBuf,
    poll_interval: Duration,
    sender: watch::Sender<Arc<WatchConfig>>,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

    /// Watch `path`, starting from `initial`. Returns the watcher and the
    /// receiver the scheduler subscribes to.
    pub fn new(
        path: impl Into<PathBuf>,
        initial: WatchConfig,
    ) -> (Self, watch::Receiver<Arc<WatchConfig>>) {
        let path = path.into();
        let last_modified = modified(&path);
        let (sender, receiver) = watch::channel(Arc::new(initial));
        let watcher = Self {
            path,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            sender,
            last_modified,
        };
        (watcher, receiver)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Check the file once; returns `true` when a new revision was published.
    pub fn poll(&mut self) -> bool {
        let Some(current) = modified(&self.path) else {
            return false;
        };
        if self.last_modified.is_some_and(|last| current <= last) {
            return false;
        }
        self.last_modified = Some(current);

        match load_config(&self.path) {
            Ok(file) => {
                let config = file.to_watch_config();
                info!(
                    path = %self.path.display(),
                    instruments = config.instruments.len(),
                    "Configuration reloaded"
                );
                self.sender.send_replace(Arc::new(config));
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Reload failed, keeping current configuration");
                false
            }
        }
    }

    /// Poll until `shutdown` flips to `true` or every receiver is gone.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        debug!(path = %self.path.display(), "Watching configuration file");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.sender.is_closed() {
                        break;
                    }
                    self.poll();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Configuration watcher stopped");
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{write_config, ConfigFile};
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(path: &Path, offset_secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(offset_secs))
            .unwrap();
    }

    #[test]
    fn test_poll_publishes_new_revision() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, &ConfigFile::default()).unwrap();

        let (mut watcher, receiver) = ConfigWatcher::new(&path, ConfigFile::default().to_watch_config());
        assert!(!watcher.poll());

        let mut edited = ConfigFile::default();
        edited.stocks.truncate(1);
        edited.alert_threshold_percent = 2.5;
        write_config(&path, &edited).unwrap();
        touch(&path, 10);

        assert!(watcher.poll());
        let config = receiver.borrow().clone();
        assert_eq!(config.instruments.len(), 1);
        assert_eq!(config.alert_threshold_percent, 2.5);
        assert!(!watcher.poll());
    }

    #[test]
    fn test_broken_revision_keeps_current() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, &ConfigFile::default()).unwrap();
        let (mut watcher, receiver) = ConfigWatcher::new(&path, ConfigFile::default().to_watch_config());

        std::fs::write(&path, "{ broken").unwrap();
        touch(&path, 10);

        assert!(!watcher.poll());
        assert_eq!(receiver.borrow().instruments.len(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, &ConfigFile::default()).unwrap();
        let (watcher, _receiver) = ConfigWatcher::new(&path, ConfigFile::default().to_watch_config());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(
            watcher
                .with_poll_interval(Duration::from_millis(10))
                .run(shutdown_rx),
        );
        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
