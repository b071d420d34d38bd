//! Deterministic print header/footer markup for PDF flattening.
//!
//! The flattening engine resolves the `pageNumber`/`totalPages` placeholder
//! classes itself; this module only assembles the markup and page-margin
//! parameters. `build` is a pure function of (theme, classification, title).

use crate::theme::{PrintMargins, Theme};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum page margin accepted by the flattening surface.
const MIN_MARGIN_MM: f64 = 15.0;

/// Fixed fallback applied when the theme specifies a relative font size,
/// which the flattening engine does not support in headers/footers.
const ABSOLUTE_FONT_SIZE: &str = "10px";

static MM_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*mm$").unwrap());

/// Header/footer fragments and page parameters for one PDF flattening run.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintTemplate {
    /// Header markup, empty string when there is nothing to show.
    pub header_html: String,
    /// Footer markup, empty string when the theme disables the footer.
    pub footer_html: String,
    /// Normalized millimeter margins for each page edge.
    pub margins: PrintMargins,
    /// Extra bottom padding reserved for the footer band.
    pub content_bottom_padding: String,
}

/// Normalize a margin to a millimeter value with an enforced minimum.
///
/// Any non-millimeter or unparsable value is replaced by the minimum
/// outright, not merely clamped.
pub fn normalize_margin(raw: &str) -> String {
    match MM_VALUE.captures(raw.trim()) {
        Some(cap) => {
            let mm: f64 = cap[1].parse().unwrap_or(MIN_MARGIN_MM);
            if mm < MIN_MARGIN_MM {
                format!("{MIN_MARGIN_MM}mm")
            } else {
                format!("{mm}mm")
            }
        }
        None => format!("{MIN_MARGIN_MM}mm"),
    }
}

/// Map relative font sizes to the fixed absolute fallback.
fn absolute_font_size(raw: &str) -> String {
    let raw = raw.trim();
    let relative = raw.ends_with("em") || raw.ends_with('%') || raw.parse::<f64>().is_ok();
    if relative || raw.is_empty() {
        ABSOLUTE_FONT_SIZE.to_string()
    } else {
        raw.to_string()
    }
}

/// Minimal HTML escaping for text interpolated into the templates.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the header and footer fragments for the given theme, document
/// classification and title.
pub fn build(theme: &Theme, classification: Option<&str>, title: &str) -> PrintTemplate {
    let font_family = &theme.print_font_family;
    let font_size = absolute_font_size(&theme.print_font_size);

    let margins = PrintMargins {
        top: normalize_margin(&theme.print_margins.top),
        right: normalize_margin(&theme.print_margins.right),
        bottom: normalize_margin(&theme.print_margins.bottom),
        left: normalize_margin(&theme.print_margins.left),
    };

    let mut header_parts = Vec::new();
    if let Some(classification) = classification.filter(|c| !c.trim().is_empty()) {
        let colors = theme.classification_colors_for(classification);
        header_parts.push(format!(
            "<span style=\"background:{};color:{};border-radius:9px;\
             padding:2px 10px;font-weight:bold;\">{}</span>",
            colors.background,
            colors.foreground,
            escape_html(classification)
        ));
    }
    if !title.is_empty() {
        header_parts.push(format!("<span>{}</span>", escape_html(title)));
    }

    let header_html = if header_parts.is_empty() {
        String::new()
    } else {
        format!(
            "<div style=\"font-family:{font_family};font-size:{font_size};width:100%;\
             display:flex;align-items:center;gap:8px;padding:0 10mm;\">{}</div>",
            header_parts.join("")
        )
    };

    let footer_html = if theme.print_footer {
        let label = escape_html(&theme.footer_label);
        let company = if theme.company.is_empty() {
            String::new()
        } else {
            format!("<span>{}</span>", escape_html(&theme.company))
        };
        format!(
            "<div style=\"font-family:{font_family};font-size:{font_size};width:100%;\
             display:flex;justify-content:space-between;padding:0 10mm;\">\
             <span>{label} <span class=\"pageNumber\"></span> / \
             <span class=\"totalPages\"></span></span>{company}</div>"
        )
    } else {
        String::new()
    };

    let content_bottom_padding = if theme.print_footer { "10mm" } else { "0mm" }.to_string();

    PrintTemplate {
        header_html,
        footer_html,
        margins,
        content_bottom_padding,
    }
}
