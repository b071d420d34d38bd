//! Core library for mdlive - the live markdown preview pipeline.
//!
//! # Modules
//!
//! - [`error`] - Per-revision failure taxonomy
//! - [`metadata`] - Frontmatter and bare key-value metadata extraction
//! - [`title`] - First top-level heading detection and removal
//! - [`sanitize`] - Stripping consumed metadata lines from the body
//! - [`theme`] - Presentation profiles with per-field default fallback
//! - [`render`] - Markdown to HTML conversion
//! - [`print`] - Print header/footer templates for PDF flattening
//! - [`pipeline`] - Read/extract/resolve/sanitize/convert orchestration
//! - [`watcher`] - File watching abstraction

pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod print;
pub mod render;
pub mod sanitize;
pub mod theme;
pub mod title;
pub mod watcher;

pub use error::PreviewError;
pub use metadata::{extract_metadata, Metadata};
pub use pipeline::{BroadcastPayload, RenderPipeline, Update};
pub use print::{build as build_print_template, PrintTemplate};
pub use sanitize::sanitize;
pub use theme::{resolve as resolve_theme, Theme};
pub use title::{extract_title, TitleExtraction};
pub use watcher::{FileWatcher, WatchEvent};
