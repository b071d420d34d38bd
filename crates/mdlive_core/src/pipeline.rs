//! The render pipeline: read, extract, resolve, sanitize, convert.
//!
//! Each run re-reads the tracked file in full and produces one [`Update`]
//! whose html, title and metadata all describe the same on-disk revision.
//! Overlapping runs are not coalesced; the guarantee is only eventual
//! consistency, whichever run completes last determines the broadcast
//! state.

use crate::error::PreviewError;
use crate::metadata::{extract_metadata, Metadata};
use crate::render;
use crate::sanitize::sanitize;
use crate::theme::{self, Theme};
use crate::title::extract_title;
use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The atomic unit pushed to viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastPayload {
    pub html: String,
    pub title: String,
    pub meta: Metadata,
    /// Monotonically increasing revision counter; viewers may discard
    /// out-of-order payloads after rapid successive edits.
    pub revision: u64,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A full re-render of the tracked file.
    Content(BroadcastPayload),
    /// A user-visible error; previously rendered viewer state stays
    /// untouched until the next successful run.
    Error(String),
}

/// Orchestrates one full re-render per trigger and owns the process-wide
/// current theme.
pub struct RenderPipeline {
    file_path: PathBuf,
    themes_dir: PathBuf,
    theme_override: Option<String>,
    /// Immutable value swapped by reference at the end of every successful
    /// run; readers take a snapshot, never a mutable handle.
    current_theme: RwLock<Arc<Theme>>,
    revision: AtomicU64,
}

impl RenderPipeline {
    pub fn new(file_path: PathBuf, themes_dir: PathBuf, theme_override: Option<String>) -> Self {
        Self {
            file_path,
            themes_dir,
            theme_override,
            current_theme: RwLock::new(Arc::new(Theme::default())),
            revision: AtomicU64::new(0),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn theme_override(&self) -> Option<&str> {
        self.theme_override.as_deref()
    }

    /// Snapshot of the currently effective theme.
    pub fn current_theme(&self) -> Arc<Theme> {
        self.current_theme.read().clone()
    }

    /// Extract metadata and title from the tracked file as it is on disk
    /// right now, without broadcasting. Used by the PDF export surface.
    pub fn read_document_facts(&self) -> std::io::Result<(Metadata, String)> {
        let text = std::fs::read_to_string(&self.file_path)?;
        let metadata = extract_metadata(&text).metadata;
        let title = extract_title(&sanitize(&text)).title;
        Ok((metadata, title))
    }

    /// Run the full pipeline once.
    ///
    /// A missing or unreadable file short-circuits to an error update; no
    /// partial payload is ever produced.
    pub fn run(&self) -> Update {
        let text = match std::fs::read_to_string(&self.file_path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Update::Error(
                    PreviewError::MissingSource(self.file_path.clone()).to_string(),
                );
            }
            Err(err) => {
                return Update::Error(
                    PreviewError::Unreadable {
                        path: self.file_path.clone(),
                        source: err,
                    }
                    .to_string(),
                );
            }
        };

        let metadata = extract_metadata(&text).metadata;

        // The command-line override beats the document's own selector.
        let theme_name = self
            .theme_override
            .as_deref()
            .or(metadata.theme.as_deref());
        let resolved = Arc::new(theme::resolve(&self.themes_dir, theme_name));
        *self.current_theme.write() = resolved;

        let sanitized = sanitize(&text);
        let extraction = extract_title(&sanitized);
        let html = render::to_html(&extraction.content);

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;

        Update::Content(BroadcastPayload {
            html,
            title: extraction.title,
            meta: metadata,
            revision,
        })
    }
}
