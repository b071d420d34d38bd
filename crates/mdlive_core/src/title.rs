//! Locating the document title heading.
//!
//! Only the *first* top-level heading in document order qualifies as the
//! title. ATX form: a line starting with exactly one `#` followed by
//! whitespace. Setext form: a non-blank line whose next line consists
//! entirely of `=` characters. Headings of level two or deeper never
//! qualify.

use once_cell::sync::Lazy;
use regex::Regex;

static ATX_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(.*)$").unwrap());

static SETEXT_UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+\s*$").unwrap());

/// A document split into its title and remaining content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleExtraction {
    /// Text of the first top-level heading, empty when none exists.
    pub title: String,
    /// Document text with the heading line(s) and one trailing blank line
    /// removed. Equals the input when no title was found.
    pub content: String,
}

/// 0-based line index of the first top-level heading, plus the number of
/// lines the heading occupies (1 for ATX, 2 for setext).
pub(crate) fn find_title_line(text: &str) -> Option<(usize, usize, String)> {
    let lines: Vec<&str> = text.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(cap) = ATX_TITLE.captures(line) {
            return Some((idx, 1, cap[1].trim().to_string()));
        }
        if !line.trim().is_empty() {
            if let Some(next) = lines.get(idx + 1) {
                if SETEXT_UNDERLINE.is_match(next) {
                    return Some((idx, 2, line.trim().to_string()));
                }
            }
        }
    }
    None
}

/// Split the document into `{title, content}`.
pub fn extract_title(text: &str) -> TitleExtraction {
    let Some((start, span, title)) = find_title_line(text) else {
        return TitleExtraction {
            title: String::new(),
            content: text.to_string(),
        };
    };

    let lines: Vec<&str> = text.lines().collect();
    let mut end = start + span;
    // Swallow one blank line right after the heading to avoid a leading gap
    // in the rendered body.
    if lines.get(end).is_some_and(|l| l.trim().is_empty()) {
        end += 1;
    }

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len().saturating_sub(end - start));
    kept.extend(&lines[..start]);
    kept.extend(&lines[end..]);

    let mut content = kept.join("\n");
    if text.ends_with('\n') && !content.is_empty() {
        content.push('\n');
    }

    TitleExtraction { title, content }
}
