//! Assembly of the viewer page from the current effective theme.
//!
//! The shell is an embedded template with two substitution tokens; the
//! theme-dependent CSS (fonts, sizes, badge colors, optional heading
//! numbering) is generated here so the served page always matches the
//! theme resolved by the latest pipeline run.

use mdlive_core::theme::{neutral_color_pair, Theme};

/// HTML shell with `__THEME_CSS__` and `__LOGO_HTML__` tokens.
const PAGE_TEMPLATE: &str = include_str!("../assets/index.html");

/// CSS class suffix for a classification name: lowercased, runs of
/// non-alphanumeric characters collapsed to a single hyphen.
fn badge_class(name: &str) -> String {
    let mut class = String::with_capacity(name.len());
    let mut last_hyphen = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            class.push(c);
            last_hyphen = false;
        } else if !last_hyphen {
            class.push('-');
            last_hyphen = true;
        }
    }
    class.trim_matches('-').to_string()
}

fn theme_css(theme: &Theme) -> String {
    let mut css = String::new();

    css.push_str(&format!(
        "body {{ font-family: {}; font-size: {}; max-width: 900px; \
         margin: 0 auto; padding: 20px; line-height: 1.6; }}\n",
        theme.font_family, theme.body_font_size
    ));
    for (level, size) in theme.heading_font_sizes.iter().enumerate() {
        css.push_str(&format!("h{} {{ font-size: {size}; }}\n", level + 1));
    }

    css.push_str(
        ".header { background: #f8f9fa; padding: 10px 20px; border-radius: 5px; \
         margin-bottom: 20px; display: flex; align-items: center; gap: 12px; }\n\
         .header h1 { margin: 0; flex: 1; }\n\
         .header img.logo { height: 32px; }\n\
         .status { font-weight: bold; }\n\
         .content { border: 1px solid #e9ecef; border-radius: 5px; padding: 20px; \
         background: white; }\n\
         .error { color: #dc3545; background: #f8d7da; padding: 10px; \
         border-radius: 5px; margin-bottom: 20px; }\n",
    );

    let neutral = neutral_color_pair();
    css.push_str(&format!(
        ".badge {{ display: none; background: {}; color: {}; border-radius: 9px; \
         padding: 2px 10px; font-weight: bold; font-size: 0.8em; }}\n",
        neutral.background, neutral.foreground
    ));
    for (name, colors) in &theme.classification_colors {
        css.push_str(&format!(
            ".badge-{} {{ background: {}; color: {}; }}\n",
            badge_class(name),
            colors.background,
            colors.foreground
        ));
    }

    if theme.number_headings {
        css.push_str(&heading_numbering_css(theme.numbering_max_depth));
    }

    css
}

/// CSS-counter auto-numbering for headings in the rendered body, down to
/// `max_depth`.
fn heading_numbering_css(max_depth: u8) -> String {
    let max_depth = max_depth.clamp(1, 6);
    let mut css = String::from(".content { counter-reset: h1; }\n");
    for level in 1..=max_depth {
        let reset = if level < 6 {
            format!(" counter-reset: h{};", level + 1)
        } else {
            String::new()
        };
        css.push_str(&format!(
            ".content h{level} {{ counter-increment: h{level};{reset} }}\n"
        ));
        let counters: Vec<String> = (1..=level).map(|l| format!("counter(h{l})")).collect();
        css.push_str(&format!(
            ".content h{level}::before {{ content: {} \". \"; }}\n",
            counters.join(" \".\" ")
        ));
    }
    css
}

/// Build the viewer page for the given theme. `logo_url` points into the
/// static theme assets when the theme ships a logo.
pub fn build_page(theme: &Theme, logo_url: Option<&str>) -> String {
    let logo_html = match logo_url {
        Some(url) => format!("<img class=\"logo\" src=\"{url}\" alt=\"logo\">"),
        None => String::new(),
    };

    PAGE_TEMPLATE
        .replace("__THEME_CSS__", &theme_css(theme))
        .replace("__LOGO_HTML__", &logo_html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_carries_theme_fonts() {
        let theme = Theme {
            font_family: "Georgia, serif".into(),
            ..Theme::default()
        };
        let page = build_page(&theme, None);
        assert!(page.contains("Georgia, serif"));
        assert!(page.contains("markdown-update"));
    }

    #[test]
    fn test_badge_classes_for_default_levels() {
        let page = build_page(&Theme::default(), None);
        for class in [
            ".badge-public",
            ".badge-internal",
            ".badge-confidential",
            ".badge-restricted",
        ] {
            assert!(page.contains(class), "missing {class}");
        }
    }

    #[test]
    fn test_badge_class_slugging() {
        assert_eq!(badge_class("Top Secret"), "top-secret");
        assert_eq!(badge_class("Internal"), "internal");
        assert_eq!(badge_class("A//B"), "a-b");
    }

    #[test]
    fn test_numbering_only_when_enabled() {
        let plain = build_page(&Theme::default(), None);
        assert!(!plain.contains("counter-increment"));

        let numbered = build_page(
            &Theme {
                number_headings: true,
                numbering_max_depth: 2,
                ..Theme::default()
            },
            None,
        );
        assert!(numbered.contains("counter-increment: h1"));
        assert!(numbered.contains("counter-increment: h2"));
        assert!(!numbered.contains("counter-increment: h3"));
    }

    #[test]
    fn test_logo_included_when_present() {
        let page = build_page(&Theme::default(), Some("/themes/acme/logo.svg"));
        assert!(page.contains("/themes/acme/logo.svg"));

        let without = build_page(&Theme::default(), None);
        assert!(!without.contains("img class=\"logo\""));
    }
}
