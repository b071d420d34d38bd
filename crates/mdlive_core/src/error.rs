//! Per-revision failure taxonomy.
//!
//! These failures stay local to one pipeline run and are reported over
//! the broadcast channel; the preview service survives an unreadable or
//! malformed document indefinitely. Only configuration-time failures
//! (handled in the binary) are fatal.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Tracked file absent at read time.
    #[error("File {} not found", .0.display())]
    MissingSource(PathBuf),
    /// Tracked file present but unreadable.
    #[error("Error reading file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_message() {
        let err = PreviewError::MissingSource(PathBuf::from("doc.md"));
        assert_eq!(err.to_string(), "File doc.md not found");
    }
}
