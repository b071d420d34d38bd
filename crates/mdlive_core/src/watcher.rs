//! File watching abstraction for the tracked document.
//!
//! The notification carries no payload beyond the fact of change; the
//! dispatcher re-reads the file in full anyway. Uses a notify-based
//! watcher when available and falls back to mtime polling otherwise.

use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tokio::sync::watch;

/// A change notification for the tracked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchEvent;

/// Configuration for the polling fallback.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

/// Watches a single file for modification.
pub struct FileWatcher {
    event_rx: watch::Receiver<WatchEvent>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    file_path: PathBuf,
}

type WatcherError = Box<dyn std::error::Error + Send + Sync>;

impl FileWatcher {
    /// Start watching `path`. Tries the platform notifier first, falling
    /// back to polling when it cannot be set up.
    pub fn new(path: &Path, config: WatcherConfig) -> Result<Self, WatcherError> {
        let file_path = path.to_path_buf();

        match Self::try_notify_watcher(&file_path) {
            Ok((event_rx, shutdown_tx)) => {
                tracing::info!(path = ?file_path, "Started notify-based file watcher");
                Ok(Self {
                    event_rx,
                    shutdown_tx: Some(shutdown_tx),
                    file_path,
                })
            }
            Err(err) => {
                tracing::warn!(?err, path = ?file_path, "notify watcher failed, polling instead");
                let (event_rx, shutdown_tx) = Self::spawn_polling_watcher(&file_path, config);
                Ok(Self {
                    event_rx,
                    shutdown_tx: Some(shutdown_tx),
                    file_path,
                })
            }
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<WatchEvent> {
        self.event_rx.clone()
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn try_notify_watcher(
        file_path: &Path,
    ) -> Result<(watch::Receiver<WatchEvent>, mpsc::Sender<()>), WatcherError> {
        let (event_tx, event_rx) = watch::channel(WatchEvent);
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();

        // Watch the parent directory: editors that save via write-rename
        // replace the inode, a watch on the file itself would go stale.
        let (watch_target, file_name) =
            match (file_path.parent(), file_path.file_name()) {
                (Some(parent), Some(name)) => (parent.to_path_buf(), name.to_os_string()),
                _ => return Err("Invalid file path".into()),
            };

        std::thread::spawn(move || {
            let mut watcher = match RecommendedWatcher::new(
                move |res: Result<NotifyEvent, notify::Error>| match res {
                    Ok(event) => {
                        let is_target = event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(&file_name));
                        if is_target
                            && (event.kind.is_modify()
                                || event.kind.is_create()
                                || event.kind.is_remove())
                        {
                            let _ = event_tx.send(WatchEvent);
                        }
                    }
                    Err(err) => {
                        tracing::error!(?err, "File watcher error");
                    }
                },
                notify::Config::default(),
            ) {
                Ok(watcher) => watcher,
                Err(err) => {
                    let _ = started_tx.send(Err(err.to_string()));
                    return;
                }
            };

            if let Err(err) = watcher.watch(&watch_target, RecursiveMode::NonRecursive) {
                let _ = started_tx.send(Err(err.to_string()));
                return;
            }

            let _ = started_tx.send(Ok(()));

            // Keep the watcher alive until shutdown.
            loop {
                match shutdown_rx.recv_timeout(std::time::Duration::from_secs(1)) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }
            }
        });

        match started_rx.recv_timeout(std::time::Duration::from_secs(2)) {
            Ok(Ok(())) => Ok((event_rx, shutdown_tx)),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err("Watcher startup timeout".into()),
        }
    }

    fn spawn_polling_watcher(
        file_path: &Path,
        config: WatcherConfig,
    ) -> (watch::Receiver<WatchEvent>, mpsc::Sender<()>) {
        let (event_tx, event_rx) = watch::channel(WatchEvent);
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let file_path = file_path.to_path_buf();
        let poll_interval = std::time::Duration::from_millis(config.poll_interval_ms);

        tokio::spawn(async move {
            let mut last_mtime = std::fs::metadata(&file_path).and_then(|m| m.modified()).ok();

            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                tokio::time::sleep(poll_interval).await;

                let current_mtime = std::fs::metadata(&file_path).and_then(|m| m.modified()).ok();
                match (last_mtime, current_mtime) {
                    (Some(last), Some(current)) if current > last => {
                        let _ = event_tx.send(WatchEvent);
                        last_mtime = Some(current);
                    }
                    (None, Some(current)) => {
                        // File reappeared after being missing.
                        let _ = event_tx.send(WatchEvent);
                        last_mtime = Some(current);
                    }
                    (_, None) => {
                        // File disappeared; report once so viewers see the
                        // error instead of stale content.
                        if last_mtime.take().is_some() {
                            let _ = event_tx.send(WatchEvent);
                        }
                    }
                    _ => {}
                }
            }
        });

        (event_rx, shutdown_tx)
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
