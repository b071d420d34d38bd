//! Change dispatcher: reacts to file-change notifications by re-running
//! the pipeline and fanning the result out to all connected viewers.

use mdlive_core::pipeline::{RenderPipeline, Update};
use mdlive_core::watcher::WatchEvent;
use std::sync::Arc;
use tokio::sync::watch;

/// Run the pipeline once for the initial state, then keep re-running it on
/// every change notification. Returns the receiving side handed to each
/// websocket connection.
pub fn spawn_dispatcher(
    pipeline: Arc<RenderPipeline>,
    mut file_events: watch::Receiver<WatchEvent>,
) -> watch::Receiver<Update> {
    let (update_tx, update_rx) = watch::channel(pipeline.run());

    tokio::spawn(async move {
        while file_events.changed().await.is_ok() {
            tracing::info!(path = ?pipeline.file_path(), "File changed, updating...");
            // Overlapping triggers are not coalesced; whichever run
            // completes last determines the broadcast state.
            update_tx.send_replace(pipeline.run());
        }
    });

    update_rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdlive_core::watcher::{FileWatcher, WatcherConfig};

    #[tokio::test]
    async fn test_dispatcher_rebroadcasts_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("doc.md");
        std::fs::write(&file_path, "# One\n\nfirst\n").unwrap();

        let pipeline = Arc::new(RenderPipeline::new(
            file_path.clone(),
            dir.path().join("themes"),
            None,
        ));
        let watcher = FileWatcher::new(&file_path, WatcherConfig::default()).unwrap();
        let mut updates = spawn_dispatcher(pipeline, watcher.subscribe());

        match &*updates.borrow() {
            Update::Content(payload) => assert_eq!(payload.title, "One"),
            Update::Error(err) => panic!("unexpected error: {err}"),
        }

        std::fs::write(&file_path, "# Two\n\nsecond\n").unwrap();

        let changed =
            tokio::time::timeout(std::time::Duration::from_secs(5), updates.changed()).await;
        assert!(changed.is_ok_and(|r| r.is_ok()));
        match &*updates.borrow() {
            Update::Content(payload) => {
                assert_eq!(payload.title, "Two");
                assert!(payload.html.contains("second"));
            }
            Update::Error(err) => panic!("unexpected error: {err}"),
        };
    }

    #[tokio::test]
    async fn test_initial_error_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.md");
        let pipeline = Arc::new(RenderPipeline::new(
            missing.clone(),
            dir.path().join("themes"),
            None,
        ));
        let watcher = FileWatcher::new(&missing, WatcherConfig::default()).unwrap();
        let updates = spawn_dispatcher(pipeline, watcher.subscribe());

        assert!(matches!(&*updates.borrow(), Update::Error(_)));
    }
}
