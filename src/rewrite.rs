//! Asset reference rewriting for the flattened output layout.
//!
//! Partials are authored next to their component, so they reference images
//! like `../../components/header/common/images/logo.png`. In the output all
//! component images live flat under `images/`, and every emitted HTML/CSS
//! file goes through [`rewrite_refs`] to match.
//!
//! | Input | Output |
//! |-------|--------|
//! | `../../components/header/common/images/logo.png` | `images/header/logo.png` |
//! | `../public/images/hero.jpg` | `images/public/images/hero.jpg` |
//! | `https://cdn.example.com/a.png` | unchanged |
//! | `./js/main.js` | unchanged |
//!
//! The scan is textual (no DOM or CSSOM), so a reference inside an HTML or
//! CSS comment is rewritten too.

use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};

/// Directory names that only structure the component tree.
pub const STRUCTURAL_SEGMENTS: &[&str] = &["components", "common", "images"];

const PASSTHROUGH_PREFIXES: &[&str] = &["http", "//", "#", "data:"];
const PASSTHROUGH_SUFFIXES: &[&str] = &[".js", ".css", ".html"];

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(src|href|srcset|url)\s*(=|\()\s*["']?([^"')]+)["']?\)?"#).unwrap()
});

/// Map a raw asset reference to its path relative to the output root.
///
/// Never fails: anything it does not recognize comes back untouched.
pub fn resolve(raw: &str) -> Cow<'_, str> {
    if raw.is_empty()
        || PASSTHROUGH_SUFFIXES.iter().any(|s| raw.ends_with(s))
        || PASSTHROUGH_PREFIXES.iter().any(|p| raw.starts_with(p))
    {
        return Cow::Borrowed(raw);
    }

    let clean = strip_relative_prefix(raw);
    let clean = clean.strip_prefix("src/").unwrap_or(clean);

    if clean.contains("components/") {
        let kept: Vec<&str> = clean
            .split(['/', '\\'])
            .filter(|seg| !STRUCTURAL_SEGMENTS.contains(seg))
            .collect();
        return Cow::Owned(format!("images/{}", kept.join("/")));
    }

    if clean.contains("public/images/") {
        return Cow::Owned(clean.replacen("public/images/", "images/public/images/", 1));
    }

    Cow::Borrowed(raw)
}

/// Drop any leading run of `./` and `../` segments.
fn strip_relative_prefix(mut path: &str) -> &str {
    loop {
        if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else {
            return path;
        }
    }
}

/// Rewrite every `src=`, `href=`, `srcset=` and `url(...)` value in `text`.
///
/// Attributes keep single quotes when the original used them and get double
/// quotes otherwise; `url(...)` always becomes `url("...")`.
pub fn rewrite_refs(text: &str) -> Cow<'_, str> {
    REFERENCE.replace_all(text, |caps: &Captures| {
        let attr = &caps[1];
        let fixed = resolve(&caps[3]);

        if attr.eq_ignore_ascii_case("url") {
            return format!(r#"url("{fixed}")"#);
        }

        let quote = if caps[0].contains('\'') { '\'' } else { '"' };
        format!("{attr}={quote}{fixed}{quote}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_passthrough_prefixes() {
        for raw in [
            "http://example.com/a.png",
            "https://cdn.example.com/components/x/images/a.png",
            "//cdn.example.com/a.png",
            "#top",
            "data:image/png;base64,AAAA",
        ] {
            assert_eq!(resolve(raw), raw);
        }
    }

    #[test]
    fn test_resolve_passthrough_suffixes() {
        for raw in [
            "./js/main.js",
            "css/main.css",
            "about.html",
            "../components/slider/images/slider.js",
        ] {
            assert_eq!(resolve(raw), raw);
        }
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve(""), "");
    }

    #[test]
    fn test_resolve_component_image() {
        assert_eq!(
            resolve("../../components/header/common/images/logo.png"),
            "images/header/logo.png"
        );
        assert_eq!(
            resolve("./src/components/footer/images/icons/mail.svg"),
            "images/footer/icons/mail.svg"
        );
        assert_eq!(resolve("components/a/images/x.png"), "images/a/x.png");
    }

    #[test]
    fn test_resolve_backslash_segments() {
        assert_eq!(
            resolve("components/card\\images\\bg.jpg"),
            "images/card/bg.jpg"
        );
    }

    #[test]
    fn test_resolve_public_images() {
        assert_eq!(
            resolve("../public/images/hero.jpg"),
            "images/public/images/hero.jpg"
        );
        assert_eq!(
            resolve("src/public/images/team/anna.webp"),
            "images/public/images/team/anna.webp"
        );
    }

    #[test]
    fn test_resolve_unmatched_is_unchanged() {
        // the original string comes back, relative prefix included
        assert_eq!(resolve("../fonts/Roboto.woff2"), "../fonts/Roboto.woff2");
        assert_eq!(resolve("./images/logo.png"), "./images/logo.png");
        assert_eq!(resolve("mailto:hi@example.com"), "mailto:hi@example.com");
    }

    #[test]
    fn test_rewrite_preserves_single_quotes() {
        assert_eq!(
            rewrite_refs("<img src='components/a/images/x.png'>"),
            "<img src='images/a/x.png'>"
        );
    }

    #[test]
    fn test_rewrite_double_quotes() {
        assert_eq!(
            rewrite_refs(r#"<img src="../components/hero/images/bg.jpg" alt="">"#),
            r#"<img src="images/hero/bg.jpg" alt="">"#
        );
    }

    #[test]
    fn test_rewrite_css_url_forms() {
        let css = "a{background:url(../components/a/images/x.png)}b{background:url('../public/images/y.jpg')}";
        assert_eq!(
            rewrite_refs(css),
            r#"a{background:url("images/a/x.png")}b{background:url("images/public/images/y.jpg")}"#
        );
    }

    #[test]
    fn test_rewrite_multiple_on_one_line() {
        let html = r##"<a href="#main"><img src="components/nav/images/a.png"></a><link href="css/main.css">"##;
        assert_eq!(
            rewrite_refs(html),
            r##"<a href="#main"><img src="images/nav/a.png"></a><link href="css/main.css">"##
        );
    }

    #[test]
    fn test_rewrite_srcset_and_case() {
        assert_eq!(
            rewrite_refs(r#"<source srcset="components/a/images/x.webp">"#),
            r#"<source srcset="images/a/x.webp">"#
        );
        assert_eq!(
            rewrite_refs(r#"<IMG SRC="components/a/images/x.png">"#),
            r#"<IMG SRC="images/a/x.png">"#
        );
    }

    #[test]
    fn test_rewrite_spaces_around_separator() {
        assert_eq!(
            rewrite_refs(r#"<img src = "components/a/images/x.png">"#),
            r#"<img src="images/a/x.png">"#
        );
    }

    #[test]
    fn test_rewrite_leaves_other_text_alone() {
        let text = "<p>No references here, just prose (and parens).</p>";
        assert_eq!(rewrite_refs(text), text);
    }
}
