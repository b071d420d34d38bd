//! Removal of consumed metadata lines from the rendered body.
//!
//! Removal is driven by the extractor's positional record: only lines that
//! actually sourced a recognized key (or a whole frontmatter block) are
//! candidates, filtered to the header region. Stripping repeats until the
//! text is stable, so a key-like line shifted to the top of the document by
//! an earlier removal is treated as metadata junk and stripped too; running
//! the sanitizer on its own output is always a no-op. Key lines past the
//! header region are body content and survive every pass, which bounds the
//! side effects of the loosely-patterned key match.

use crate::metadata::{extract_metadata, MetadataSource};
use crate::title::find_title_line;

/// Upper bound on the bare-key header region when the document has no
/// title.
const HEADER_REGION_LINES: usize = 30;

/// Strip metadata lines from `text`.
///
/// A closed frontmatter block at the start of the document is removed
/// wholesale, delimiters and unrecognized keys included. Otherwise, the
/// bare `sensitivity:` / `theme:` lines the extractor consumed are removed
/// when they occur before the title line, or within the first
/// [`HEADER_REGION_LINES`] lines when no title exists. One blank line
/// immediately following each removed region is dropped as well.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    // Every non-trivial pass removes at least one line, so this terminates.
    loop {
        match sanitize_pass(&current) {
            Some(stripped) => current = stripped,
            None => return current,
        }
    }
}

/// One stripping pass. Returns `None` when there is nothing to remove.
fn sanitize_pass(text: &str) -> Option<String> {
    let removed: Vec<usize> = match extract_metadata(text).source {
        MetadataSource::Frontmatter { closing_line } => (0..=closing_line).collect(),
        MetadataSource::BareLines(consumed) => {
            let bound = find_title_line(text)
                .map(|(title_line, _, _)| title_line)
                .unwrap_or(HEADER_REGION_LINES)
                .min(HEADER_REGION_LINES);
            consumed.into_iter().filter(|idx| *idx < bound).collect()
        }
        MetadataSource::Absent => Vec::new(),
    };

    if removed.is_empty() {
        return None;
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut skip_blank = false;
    for (idx, line) in lines.iter().enumerate() {
        if removed.contains(&idx) {
            skip_blank = true;
            continue;
        }
        if skip_blank {
            skip_blank = false;
            if line.trim().is_empty() {
                continue;
            }
        }
        kept.push(line);
    }

    let mut sanitized = kept.join("\n");
    if text.ends_with('\n') && !sanitized.is_empty() {
        sanitized.push('\n');
    }
    Some(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_block_removed_entirely() {
        let text = "---\nauthor: Jane\nsensitivity: Confidential\n---\n\n# Report\n\nBody.\n";
        let sanitized = sanitize(text);
        assert_eq!(sanitized, "# Report\n\nBody.\n");
    }

    #[test]
    fn test_bare_lines_removed() {
        let text = "sensitivity: Internal\n\n# Report\n\nBody.\n";
        assert_eq!(sanitize(text), "# Report\n\nBody.\n");
    }

    #[test]
    fn test_idempotent() {
        let text = "---\ntheme: acme\n---\n# Report\n\nBody.\n";
        let once = sanitize(text);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_on_bare_lines() {
        let text = "theme: acme\nsensitivity: Public\n\n# Title\n\ntext\n";
        let once = sanitize(text);
        assert_eq!(once, sanitize(&once));
    }

    #[test]
    fn test_idempotent_when_removal_shifts_key_line_up() {
        // Removing the frontmatter block shifts the key-like line to the
        // top of the document, where it reads as metadata junk and is
        // stripped as well.
        let text = "---\ntheme: acme\n---\nsensitivity: discussed below\n\n# Title\n";
        let once = sanitize(text);
        assert_eq!(once, "# Title\n");
        assert_eq!(once, sanitize(&once));
    }

    #[test]
    fn test_keys_after_title_kept_as_body() {
        let text = "# Config Reference\n\nsensitivity: how to set it\n";
        let sanitized = sanitize(text);
        assert!(sanitized.contains("sensitivity: how to set it"));
    }

    #[test]
    fn test_keys_after_title_kept_even_with_frontmatter() {
        let text = "---\ntheme: acme\n---\n# Title\n\nsensitivity: how to set it\n";
        let sanitized = sanitize(text);
        assert_eq!(sanitized, "# Title\n\nsensitivity: how to set it\n");
        assert_eq!(sanitized, sanitize(&sanitized));
    }

    #[test]
    fn test_key_before_late_title_removed() {
        let text = "theme: dark\n\nIntro.\n\n# Late Title\n";
        let sanitized = sanitize(text);
        assert!(!sanitized.contains("theme: dark"));
        assert!(sanitized.contains("# Late Title"));
    }

    #[test]
    fn test_scan_window_capped_without_title() {
        let mut text = String::new();
        for _ in 0..HEADER_REGION_LINES {
            text.push_str("filler\n");
        }
        text.push_str("theme: dark\n");
        // Beyond the capped window, the key line stays.
        assert_eq!(sanitize(&text), text);
    }

    #[test]
    fn test_deep_key_line_survives_shift_without_title() {
        // The stripped top key shifts the deep line upward, but it never
        // enters the extraction window and stays put on every pass.
        let mut text = String::from("theme: acme\n");
        for _ in 0..29 {
            text.push_str("filler\n");
        }
        text.push_str("sensitivity: deep in the body\n");
        let once = sanitize(&text);
        assert!(once.contains("sensitivity: deep in the body"));
        assert_eq!(once, sanitize(&once));
    }

    #[test]
    fn test_untouched_without_metadata() {
        let text = "# Title\n\nPlain body.\n";
        assert_eq!(sanitize(text), text);
    }
}
