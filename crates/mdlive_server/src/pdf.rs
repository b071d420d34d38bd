//! PDF flattening via a headless browser.
//!
//! The engine is consumed through the [`Flattener`] trait so its absence
//! degrades to a 501 on the export route instead of failing startup. The
//! concrete implementation drives Chromium's `printToPDF` through the
//! `headless_chrome` crate.

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use mdlive_core::print::PrintTemplate;
use std::time::Duration;

/// Fixed wait after navigation for font loading and layout settling.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No Chromium/Chrome installation was found.
    #[error(
        "PDF export requires a Chromium or Chrome installation. \
         Install one (e.g. `apt install chromium`) and restart."
    )]
    Unavailable,
    /// The engine failed mid-export; partially-produced bytes are never
    /// returned.
    #[error("PDF export failed: {0}")]
    Failed(String),
}

/// Flattens a rendered page into PDF bytes.
pub trait Flattener: Send + Sync {
    fn flatten(&self, url: &str, template: &PrintTemplate) -> Result<Vec<u8>, ExportError>;
}

/// Convert a normalized `"<n>mm"` margin into the inches the engine expects.
fn margin_inches(margin: &str) -> Option<f64> {
    margin
        .trim()
        .strip_suffix("mm")
        .and_then(|mm| mm.trim().parse::<f64>().ok())
        .map(|mm| mm / 25.4)
}

/// Chromium-backed [`Flattener`].
pub struct ChromiumFlattener {
    settle_delay: Duration,
}

impl ChromiumFlattener {
    /// Probe for a usable browser executable. `Err(Unavailable)` when none
    /// is installed.
    pub fn new() -> Result<Self, ExportError> {
        headless_chrome::browser::default_executable().map_err(|_| ExportError::Unavailable)?;
        Ok(Self {
            settle_delay: SETTLE_DELAY,
        })
    }
}

impl Flattener for ChromiumFlattener {
    fn flatten(&self, url: &str, template: &PrintTemplate) -> Result<Vec<u8>, ExportError> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|err| ExportError::Failed(err.to_string()))?;
        let browser = Browser::new(launch_options).map_err(|err| {
            tracing::error!(%err, "Failed to launch headless browser");
            ExportError::Failed(err.to_string())
        })?;

        let tab = browser
            .new_tab()
            .map_err(|err| ExportError::Failed(err.to_string()))?;
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|err| {
                tracing::error!(%err, url, "PDF navigation failed");
                ExportError::Failed(err.to_string())
            })?;

        std::thread::sleep(self.settle_delay);

        let has_header = !template.header_html.is_empty();
        let has_footer = !template.footer_html.is_empty();
        // Chromium renders a default header/footer for an absent template,
        // a blank span suppresses it.
        let blank = "<span></span>".to_string();

        let options = PrintToPdfOptions {
            display_header_footer: Some(has_header || has_footer),
            header_template: Some(if has_header {
                template.header_html.clone()
            } else {
                blank.clone()
            }),
            footer_template: Some(if has_footer {
                template.footer_html.clone()
            } else {
                blank
            }),
            margin_top: margin_inches(&template.margins.top),
            margin_right: margin_inches(&template.margins.right),
            margin_bottom: margin_inches(&template.margins.bottom),
            margin_left: margin_inches(&template.margins.left),
            print_background: Some(true),
            scale: Some(1.0),
            prefer_css_page_size: Some(false),
            ..Default::default()
        };

        tab.print_to_pdf(Some(options)).map_err(|err| {
            tracing::error!(%err, "printToPDF failed");
            ExportError::Failed(err.to_string())
        })
    }
}
