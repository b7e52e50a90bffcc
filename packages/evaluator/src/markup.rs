//! # Markup Policy
//!
//! Text elements hold raw markup written through the inspector. The
//! sanitized policy parses it with html5ever (through `ammonia`) and keeps
//! an allowlist of tags, attributes and URL schemes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupPolicy {
    /// Strip scripts, embeds, inline handlers and `javascript:` URLs
    #[default]
    Sanitized,
    /// Emit stored markup untouched
    Raw,
}

impl MarkupPolicy {
    pub fn from_sanitize_flag(sanitize: bool) -> Self {
        if sanitize {
            MarkupPolicy::Sanitized
        } else {
            MarkupPolicy::Raw
        }
    }

    pub fn apply(&self, markup: &str) -> String {
        match self {
            MarkupPolicy::Raw => markup.to_string(),
            MarkupPolicy::Sanitized => sanitize_markup(markup),
        }
    }
}

/// Schemes a link or image on a sanitized page may use
pub const SAFE_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Remove active content from markup
pub fn sanitize_markup(markup: &str) -> String {
    ammonia::Builder::default()
        .add_generic_attributes(["class", "style"])
        .url_schemes(SAFE_URL_SCHEMES.iter().copied().collect())
        .link_rel(None)
        .clean(markup)
        .to_string()
}

/// Whether a URL attribute value is relative or uses a safe scheme.
///
/// Browsers drop tabs and newlines anywhere in a URL and control characters
/// at either end, so those are removed before the scheme is read. Anything
/// with a colon before its first `/` or `?` must name an allowed scheme.
pub fn is_safe_url(url: &str) -> bool {
    let cleaned: String = url
        .trim_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    let Some((scheme, _)) = cleaned.split_once(':') else {
        return true;
    };
    if scheme.contains(|c: char| c == '/' || c == '?') {
        return true;
    }
    SAFE_URL_SCHEMES
        .iter()
        .any(|safe| safe.eq_ignore_ascii_case(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_markup_passes_through() {
        let markup = "<p>Refined <strong>marble</strong> for <em>timeless</em> spaces</p>";
        assert_eq!(sanitize_markup(markup), markup);
    }

    #[test]
    fn test_script_blocks_removed() {
        let out = sanitize_markup("<p>a</p><script>alert(1)</script><p>b</p>");
        assert_eq!(out, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_unclosed_script_tag_removed() {
        let out = sanitize_markup("<p>a</p><SCRIPT src=x.js>");
        assert_eq!(out, "<p>a</p>");
    }

    #[test]
    fn test_inline_handlers_removed() {
        let out = sanitize_markup(r#"<img src="a.png" onerror="alert(1)" alt="x">"#);
        assert!(out.contains(r#"src="a.png""#));
        assert!(out.contains(r#"alt="x""#));
        assert!(!out.contains("onerror"));
    }

    #[test]
    fn test_slash_separated_handlers_removed() {
        let out = sanitize_markup("<svg/onload=alert(1)>");
        assert!(!out.contains("onload"));
        assert!(!out.contains("alert"));

        let out = sanitize_markup(r#"<img src="x"/onerror="alert(1)">"#);
        assert!(!out.contains("onerror"));
        assert!(out.contains(r#"src="x""#));
    }

    #[test]
    fn test_javascript_urls_removed() {
        let plain = sanitize_markup(r#"<a href="javascript:alert(1)">x</a>"#);
        let encoded = sanitize_markup(r#"<a href="&#106;avascript:alert(1)">x</a>"#);
        let tabbed = sanitize_markup("<a href=\"java\tscript:alert(1)\">x</a>");
        for out in [plain, encoded, tabbed] {
            assert!(!out.to_ascii_lowercase().contains("script:"), "{}", out);
            assert!(out.ends_with(">x</a>"), "{}", out);
        }
    }

    #[test]
    fn test_safe_links_and_classes_kept() {
        let out = sanitize_markup(r#"<a href="https://marble.test/about" class="lead">About</a>"#);
        assert_eq!(out, r#"<a href="https://marble.test/about" class="lead">About</a>"#);
    }

    #[test]
    fn test_url_schemes() {
        assert!(is_safe_url("https://cdn.example/a.png"));
        assert!(is_safe_url("/uploads/a.png"));
        assert!(is_safe_url("#contact"));
        assert!(is_safe_url("mailto:office@marble.test"));
        assert!(is_safe_url("gallery?page=2:3"));

        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("  JavaScript:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url("\u{1}javascript:alert(1)"));
        assert!(!is_safe_url("&#106;avascript:alert(1)"));
        assert!(!is_safe_url("data:text/html,<b>x</b>"));
    }

    #[test]
    fn test_raw_policy_keeps_everything() {
        let markup = "<script>x</script>";
        assert_eq!(MarkupPolicy::Raw.apply(markup), markup);
        assert_eq!(MarkupPolicy::Sanitized.apply(markup), "");
    }
}
