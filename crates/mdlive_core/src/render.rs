//! Markdown to HTML conversion.
//!
//! Thin wrapper over `pulldown-cmark` with the GitHub-flavored extensions
//! enabled. Malformed input degrades to best-effort output, it never fails
//! the pipeline.

use pulldown_cmark::{html, Options, Parser};

fn conversion_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Convert markdown text to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, conversion_options());
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
