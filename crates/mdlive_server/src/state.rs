//! Shared server state.

use crate::pdf::Flattener;
use mdlive_core::pipeline::{RenderPipeline, Update};
use std::sync::Arc;
use tokio::sync::watch;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RenderPipeline>,
    /// Latest pipeline outcome, fanned out to every websocket connection.
    pub updates: watch::Receiver<Update>,
    /// Flattening engine, absent when no Chromium installation was found.
    pub flattener: Option<Arc<dyn Flattener>>,
    /// Port the server listens on; PDF flattening navigates back to it.
    pub port: u16,
}

impl AppState {
    /// Theme name whose static assets the page should reference: the
    /// command-line override when present, otherwise the selector from the
    /// most recently rendered revision.
    pub fn asset_theme_name(&self) -> Option<String> {
        if let Some(name) = self.pipeline.theme_override() {
            return Some(name.to_string());
        }
        match &*self.updates.borrow() {
            Update::Content(payload) => payload.meta.theme.clone(),
            Update::Error(_) => None,
        }
    }
}
