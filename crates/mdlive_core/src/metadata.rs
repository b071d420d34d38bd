//! Extraction of structural metadata from raw document text.
//!
//! Two forms are recognized, tried in this order:
//!
//! 1. A frontmatter block: the document starts with a line that is solely
//!    `---`, and a later line that is again solely `---` closes the block.
//!    `key: value` lines inside the block are parsed, keeping only the
//!    recognized keys. A closed block fully satisfies extraction, no
//!    fallback scan is performed.
//! 2. Bare `sensitivity: ...` / `theme: ...` lines anywhere within the
//!    first [`BARE_SCAN_LINES`] lines of the document.
//!
//! Keys are case-insensitive, at most one value per key is kept and the
//! first occurrence wins. Unrecognized keys never fail the parse.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of leading lines scanned for bare `key: value` metadata when no
/// frontmatter block is present.
pub const BARE_SCAN_LINES: usize = 15;

static FRONTMATTER_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^---\s*$").unwrap());

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*:\s*(.+)$").unwrap());

/// Per-revision document metadata. Recomputed from scratch on every change,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Confidentiality label, rendered as a colored badge.
    pub sensitivity: Option<String>,
    /// Theme selector overriding the default presentation profile.
    pub theme: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.sensitivity.is_none() && self.theme.is_none()
    }
}

/// Positional information about the lines the extractor consumed, so the
/// sanitizer can remove them from the rendered body later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// Lines `0..=closing_line` formed a frontmatter block, delimiters
    /// included.
    Frontmatter { closing_line: usize },
    /// Bare `key: value` lines at the given 0-based line indices.
    BareLines(Vec<usize>),
    /// Neither form was present.
    Absent,
}

/// Result of scanning raw text for metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: Metadata,
    pub source: MetadataSource,
}

/// Returns `true` if the line is solely a frontmatter delimiter, trailing
/// whitespace allowed.
pub(crate) fn is_frontmatter_delimiter(line: &str) -> bool {
    FRONTMATTER_DELIMITER.is_match(line)
}

fn recognize(key: &str, value: &str, metadata: &mut Metadata) -> bool {
    let value = value.trim();
    match key.to_ascii_lowercase().as_str() {
        "sensitivity" => {
            if metadata.sensitivity.is_none() {
                metadata.sensitivity.replace(value.to_string());
            }
            true
        }
        "theme" => {
            if metadata.theme.is_none() {
                metadata.theme.replace(value.to_string());
            }
            true
        }
        _ => false,
    }
}

/// Extract [`Metadata`] from raw document text without invoking markdown
/// conversion.
pub fn extract_metadata(text: &str) -> Extraction {
    let lines: Vec<&str> = text.lines().collect();

    // A closed frontmatter block takes precedence over everything else.
    if lines.first().is_some_and(|l| is_frontmatter_delimiter(l)) {
        if let Some(closing_offset) = lines
            .iter()
            .skip(1)
            .position(|l| is_frontmatter_delimiter(l))
        {
            let closing_line = closing_offset + 1;
            let mut metadata = Metadata::default();
            for line in &lines[1..closing_line] {
                if let Some(cap) = KEY_VALUE.captures(line) {
                    // Unrecognized keys are ignored, they never fail the block.
                    recognize(&cap[1], &cap[2], &mut metadata);
                }
            }
            return Extraction {
                metadata,
                source: MetadataSource::Frontmatter { closing_line },
            };
        }
        // An unclosed leading delimiter is not a frontmatter block; fall
        // through to the bare line scan.
    }

    let mut metadata = Metadata::default();
    let mut consumed = Vec::new();
    for (idx, line) in lines.iter().take(BARE_SCAN_LINES).enumerate() {
        if let Some(cap) = KEY_VALUE.captures(line) {
            let key = cap[1].to_ascii_lowercase();
            if key == "sensitivity" || key == "theme" {
                let already_set = (key == "sensitivity" && metadata.sensitivity.is_some())
                    || (key == "theme" && metadata.theme.is_some());
                recognize(&cap[1], &cap[2], &mut metadata);
                // Later duplicates are left in place; only the consumed
                // occurrence is reported for sanitization.
                if !already_set {
                    consumed.push(idx);
                }
            }
        }
    }

    let source = if consumed.is_empty() {
        MetadataSource::Absent
    } else {
        MetadataSource::BareLines(consumed)
    };

    Extraction { metadata, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_block() {
        let text = "---\nsensitivity: Confidential\ntheme: acme\n---\n# Report\n";
        let extraction = extract_metadata(text);
        assert_eq!(
            extraction.metadata,
            Metadata {
                sensitivity: Some("Confidential".into()),
                theme: Some("acme".into()),
            }
        );
        assert_eq!(
            extraction.source,
            MetadataSource::Frontmatter { closing_line: 3 }
        );
    }

    #[test]
    fn test_frontmatter_ignores_unrecognized_keys() {
        let text = "---\nauthor: Jane\nsensitivity: Internal\ndate: 2024-01-01\n---\nBody";
        let extraction = extract_metadata(text);
        assert_eq!(extraction.metadata.sensitivity.as_deref(), Some("Internal"));
        assert_eq!(extraction.metadata.theme, None);
    }

    #[test]
    fn test_frontmatter_first_match_wins() {
        let text = "---\ntheme: first\ntheme: second\n---\n";
        let extraction = extract_metadata(text);
        assert_eq!(extraction.metadata.theme.as_deref(), Some("first"));
    }

    #[test]
    fn test_frontmatter_suppresses_bare_scan() {
        // Bare keys after a closed block are body content.
        let text = "---\nauthor: Jane\n---\ntheme: acme\n";
        let extraction = extract_metadata(text);
        assert!(extraction.metadata.is_empty());
    }

    #[test]
    fn test_unclosed_delimiter_falls_back_to_bare_scan() {
        let text = "---\nsensitivity: Internal\nno closing delimiter";
        let extraction = extract_metadata(text);
        assert_eq!(extraction.metadata.sensitivity.as_deref(), Some("Internal"));
        assert_eq!(extraction.source, MetadataSource::BareLines(vec![1]));
    }

    #[test]
    fn test_bare_lines_case_insensitive() {
        let text = "Sensitivity: Restricted\nTHEME: dark\n\nBody";
        let extraction = extract_metadata(text);
        assert_eq!(
            extraction.metadata.sensitivity.as_deref(),
            Some("Restricted")
        );
        assert_eq!(extraction.metadata.theme.as_deref(), Some("dark"));
        assert_eq!(extraction.source, MetadataSource::BareLines(vec![0, 1]));
    }

    #[test]
    fn test_bare_scan_bounded_to_leading_lines() {
        let mut text = String::new();
        for _ in 0..BARE_SCAN_LINES {
            text.push_str("filler\n");
        }
        text.push_str("sensitivity: Confidential\n");
        let extraction = extract_metadata(&text);
        assert!(extraction.metadata.is_empty());
        assert_eq!(extraction.source, MetadataSource::Absent);
    }

    #[test]
    fn test_values_trimmed() {
        let text = "sensitivity:    Internal   \n";
        let extraction = extract_metadata(text);
        assert_eq!(extraction.metadata.sensitivity.as_deref(), Some("Internal"));
    }

    #[test]
    fn test_absent_metadata_is_not_an_error() {
        let extraction = extract_metadata("# Just a title\n\nBody text.");
        assert!(extraction.metadata.is_empty());
        assert_eq!(extraction.source, MetadataSource::Absent);
    }
}
