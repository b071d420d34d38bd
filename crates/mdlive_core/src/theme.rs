//! Presentation profiles ("themes") and their resolution.
//!
//! A theme is a fully-populated bundle of presentation parameters. User
//! profiles live at `<themes-dir>/<name>/theme.toml` and are merged onto
//! the built-in defaults field by field: a profile overriding only
//! `font-family` still receives correct defaults for margins, sizes and
//! everything else. A missing or unparsable profile falls back to the
//! default theme with a warning, it never fails the render.

use std::collections::BTreeMap;
use std::path::Path;

/// Background/foreground color pair for a classification badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub background: String,
    pub foreground: String,
}

impl ColorPair {
    fn new(background: &str, foreground: &str) -> Self {
        Self {
            background: background.to_string(),
            foreground: foreground.to_string(),
        }
    }
}

/// Neutral slate pair used when a classification value is absent from the
/// resolved color map.
pub fn neutral_color_pair() -> ColorPair {
    ColorPair::new("#e2e8f0", "#334155")
}

/// Print margins, one CSS length per edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintMargins {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Default for PrintMargins {
    fn default() -> Self {
        Self {
            top: "20mm".into(),
            right: "18mm".into(),
            bottom: "20mm".into(),
            left: "18mm".into(),
        }
    }
}

/// A resolved presentation profile. Every field is always populated;
/// unresolved or invalid user profiles fall back to these defaults per
/// field, never to an absent value.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Font stack for the rendered body.
    pub font_family: String,
    /// Body text size.
    pub body_font_size: String,
    /// Font sizes for heading levels 1 through 6.
    pub heading_font_sizes: [String; 6],
    /// Logo asset reference, relative to the theme directory. Empty when
    /// the theme ships no logo.
    pub logo: String,
    /// Brand/company label shown in the print footer.
    pub company: String,
    /// Auto-number headings in the rendered body.
    pub number_headings: bool,
    /// Deepest heading level that receives a number.
    pub numbering_max_depth: u8,
    /// Page margins used by PDF flattening.
    pub print_margins: PrintMargins,
    /// Whether the print footer is emitted at all.
    pub print_footer: bool,
    /// Label preceding the page counter in the footer.
    pub footer_label: String,
    /// Font stack for the print header/footer surface.
    pub print_font_family: String,
    /// Font size for the print header/footer surface.
    pub print_font_size: String,
    /// Classification-level name to badge colors.
    pub classification_colors: BTreeMap<String, ColorPair>,
}

impl Default for Theme {
    fn default() -> Self {
        let mut classification_colors = BTreeMap::new();
        classification_colors.insert("Public".into(), ColorPair::new("#dcfce7", "#166534"));
        classification_colors.insert("Internal".into(), ColorPair::new("#dbeafe", "#1e40af"));
        classification_colors.insert("Confidential".into(), ColorPair::new("#fef3c7", "#92400e"));
        classification_colors.insert("Restricted".into(), ColorPair::new("#fee2e2", "#991b1b"));

        Self {
            font_family:
                "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif".into(),
            body_font_size: "16px".into(),
            heading_font_sizes: [
                "2em".into(),
                "1.5em".into(),
                "1.25em".into(),
                "1em".into(),
                "0.875em".into(),
                "0.85em".into(),
            ],
            logo: String::new(),
            company: String::new(),
            number_headings: false,
            numbering_max_depth: 3,
            print_margins: PrintMargins::default(),
            print_footer: true,
            footer_label: "Page".into(),
            print_font_family: "Helvetica, Arial, sans-serif".into(),
            print_font_size: "10px".into(),
            classification_colors,
        }
    }
}

impl Theme {
    /// Look up badge colors for a classification value, falling back to the
    /// neutral pair for unknown values. The lookup is case-insensitive.
    pub fn classification_colors_for(&self, classification: &str) -> ColorPair {
        self.classification_colors
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(classification))
            .map(|(_, pair)| pair.clone())
            .unwrap_or_else(neutral_color_pair)
    }
}

/// File name of a theme profile within its theme directory.
const PROFILE_FILE: &str = "theme.toml";

/// Resolve a theme by name.
///
/// `None` or an empty name yields the built-in default theme. A named
/// profile that cannot be read or parsed logs a warning and yields the
/// default theme; a profile that parses is overlaid onto the defaults
/// field by field.
pub fn resolve(themes_dir: &Path, name: Option<&str>) -> Theme {
    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        return Theme::default();
    };

    let profile_path = themes_dir.join(name).join(PROFILE_FILE);
    let contents = match std::fs::read_to_string(&profile_path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(theme = name, path = %profile_path.display(), %err,
                "Theme profile not readable, using default theme");
            return Theme::default();
        }
    };

    let profile: toml::Value = match toml::from_str(&contents) {
        Ok(profile) => profile,
        Err(err) => {
            tracing::warn!(theme = name, path = %profile_path.display(), %err,
                "Theme profile not parsable, using default theme");
            return Theme::default();
        }
    };

    overlay(Theme::default(), &profile)
}

/// Apply each present and well-typed profile field onto `base`. Ill-typed
/// fields keep their default.
fn overlay(mut base: Theme, profile: &toml::Value) -> Theme {
    let get_str = |key: &str| profile.get(key).and_then(|v| v.as_str());
    let get_bool = |key: &str| profile.get(key).and_then(|v| v.as_bool());

    if let Some(v) = get_str("font-family") {
        base.font_family = v.to_string();
    }
    if let Some(v) = get_str("body-font-size") {
        base.body_font_size = v.to_string();
    }
    if let Some(sizes) = profile.get("heading-font-sizes").and_then(|v| v.as_array()) {
        for (level, size) in sizes.iter().take(6).enumerate() {
            if let Some(size) = size.as_str() {
                base.heading_font_sizes[level] = size.to_string();
            }
        }
    }
    if let Some(v) = get_str("logo") {
        base.logo = v.to_string();
    }
    if let Some(v) = get_str("company") {
        base.company = v.to_string();
    }
    if let Some(v) = get_bool("number-headings") {
        base.number_headings = v;
    }
    if let Some(v) = profile
        .get("numbering-max-depth")
        .and_then(|v| v.as_integer())
        .filter(|v| (1..=6).contains(v))
    {
        base.numbering_max_depth = v as u8;
    }
    if let Some(margins) = profile.get("print-margins").and_then(|v| v.as_table()) {
        let edge = |key: &str| margins.get(key).and_then(|v| v.as_str());
        if let Some(v) = edge("top") {
            base.print_margins.top = v.to_string();
        }
        if let Some(v) = edge("right") {
            base.print_margins.right = v.to_string();
        }
        if let Some(v) = edge("bottom") {
            base.print_margins.bottom = v.to_string();
        }
        if let Some(v) = edge("left") {
            base.print_margins.left = v.to_string();
        }
    }
    if let Some(v) = get_bool("print-footer") {
        base.print_footer = v;
    }
    if let Some(v) = get_str("footer-label") {
        base.footer_label = v.to_string();
    }
    if let Some(v) = get_str("print-font-family") {
        base.print_font_family = v.to_string();
    }
    if let Some(v) = get_str("print-font-size") {
        base.print_font_size = v.to_string();
    }

    // A supplied color map replaces the default map wholesale.
    if let Some(colors) = profile
        .get("classification-colors")
        .and_then(|v| v.as_table())
    {
        let mut map = BTreeMap::new();
        for (name, pair) in colors {
            let Some(pair) = pair.as_table() else {
                continue;
            };
            if let (Some(background), Some(foreground)) = (
                pair.get("background").and_then(|v| v.as_str()),
                pair.get("foreground").and_then(|v| v.as_str()),
            ) {
                map.insert(name.clone(), ColorPair::new(background, foreground));
            }
        }
        base.classification_colors = map;
    }

    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme_dir(name: &str, contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let theme_dir = dir.path().join(name);
        std::fs::create_dir_all(&theme_dir).unwrap();
        std::fs::write(theme_dir.join(PROFILE_FILE), contents).unwrap();
        dir
    }

    #[test]
    fn test_unnamed_theme_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), None), Theme::default());
        assert_eq!(resolve(dir.path(), Some("")), Theme::default());
    }

    #[test]
    fn test_missing_profile_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), Some("acme")), Theme::default());
    }

    #[test]
    fn test_unparsable_profile_falls_back_to_default() {
        let dir = theme_dir("broken", "font-family = [unterminated");
        assert_eq!(resolve(dir.path(), Some("broken")), Theme::default());
    }

    #[test]
    fn test_single_field_override_keeps_other_defaults() {
        let dir = theme_dir("mono", r#"font-family = "JetBrains Mono, monospace""#);
        let theme = resolve(dir.path(), Some("mono"));
        assert_eq!(theme.font_family, "JetBrains Mono, monospace");

        let expected = Theme {
            font_family: "JetBrains Mono, monospace".into(),
            ..Theme::default()
        };
        assert_eq!(theme, expected);
    }

    #[test]
    fn test_ill_typed_field_keeps_default() {
        let dir = theme_dir("odd", "number-headings = \"yes\"\ncompany = \"Acme\"");
        let theme = resolve(dir.path(), Some("odd"));
        assert!(!theme.number_headings);
        assert_eq!(theme.company, "Acme");
    }

    #[test]
    fn test_color_map_replaces_default_wholesale() {
        let dir = theme_dir(
            "acme",
            r##"
[classification-colors.Secret]
background = "#000000"
foreground = "#ffffff"
"##,
        );
        let theme = resolve(dir.path(), Some("acme"));
        assert_eq!(theme.classification_colors.len(), 1);
        assert!(theme.classification_colors.contains_key("Secret"));
        // The default levels are gone, lookups fall back to neutral.
        assert_eq!(
            theme.classification_colors_for("Confidential"),
            neutral_color_pair()
        );
    }

    #[test]
    fn test_classification_lookup_case_insensitive() {
        let theme = Theme::default();
        assert_eq!(
            theme.classification_colors_for("confidential"),
            theme.classification_colors_for("Confidential")
        );
    }

    #[test]
    fn test_partial_margin_override() {
        let dir = theme_dir("wide", "[print-margins]\nleft = \"25mm\"");
        let theme = resolve(dir.path(), Some("wide"));
        assert_eq!(theme.print_margins.left, "25mm");
        assert_eq!(theme.print_margins.top, PrintMargins::default().top);
    }

    #[test]
    fn test_default_classification_levels() {
        let theme = Theme::default();
        for level in ["Public", "Internal", "Confidential", "Restricted"] {
            assert!(theme.classification_colors.contains_key(level));
        }
    }
}
