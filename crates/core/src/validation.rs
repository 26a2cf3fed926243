//! Input validation utilities.
//!
//! Stored documents carry free-form attribute values (link targets, image sources, colors) that
//! end up inside HTML attributes. These functions decide which values are safe to emit.

/// URL schemes that must never reach an `href` or `src` attribute.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Named colors accepted in addition to functional and hex notation.
const NAMED_COLORS: [&str; 20] = [
    "black",
    "white",
    "red",
    "green",
    "blue",
    "yellow",
    "orange",
    "purple",
    "pink",
    "brown",
    "gray",
    "grey",
    "teal",
    "navy",
    "maroon",
    "olive",
    "silver",
    "aqua",
    "fuchsia",
    "inherit",
];

/// Returns the URL with surrounding whitespace removed if it is safe to emit.
///
/// Browsers ignore ASCII whitespace and control characters inside a scheme, so they are stripped
/// before the scheme check (`java\tscript:` is still `javascript:`).
pub fn safe_url(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let scheme_probe: String = trimmed
        .chars()
        .take(32)
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if BLOCKED_SCHEMES.iter().any(|s| scheme_probe.starts_with(s)) {
        return None;
    }

    Some(trimmed)
}

/// Returns the color with surrounding whitespace removed if it is a CSS color we accept.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`/`hsl()`/`hsla()` with
/// numeric arguments, and a short list of named colors.
pub fn safe_color(color: &str) -> Option<&str> {
    let c = color.trim();
    if c.is_empty() || c.len() > 64 {
        return None;
    }

    if let Some(hex) = c.strip_prefix('#') {
        let ok = matches!(hex.len(), 3 | 4 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit());
        return ok.then_some(c);
    }

    let lower = c.to_ascii_lowercase();
    for func in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(args) = lower.strip_prefix(func) {
            let Some(args) = args.strip_suffix(')') else {
                return None;
            };
            let ok = args
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'.' | b',' | b'%' | b' ' | b'/' | b'-'));
            return ok.then_some(c);
        }
    }

    NAMED_COLORS.contains(&lower.as_str()).then_some(c)
}

/// Returns a language tag reduced to characters safe for a class name, or `None` if nothing
/// usable remains.
pub fn safe_language_tag(language: &str) -> Option<String> {
    let tag: String = language
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-' | '_'))
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();

    (!tag.is_empty()).then_some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_url_blocks_script_schemes() {
        assert_eq!(safe_url(" https://example.com "), Some("https://example.com"));
        assert_eq!(safe_url("/relative/path"), Some("/relative/path"));
        assert_eq!(safe_url("javascript:alert(1)"), None);
        assert_eq!(safe_url("JavaScript:alert(1)"), None);
        assert_eq!(safe_url("java\tscript:alert(1)"), None);
        assert_eq!(safe_url("data:text/html;base64,AAAA"), None);
        assert_eq!(safe_url("   "), None);
    }

    #[test]
    fn safe_color_accepts_common_notations() {
        assert_eq!(safe_color("#ff0000"), Some("#ff0000"));
        assert_eq!(safe_color("#F00"), Some("#F00"));
        assert_eq!(safe_color("rgb(1, 2, 3)"), Some("rgb(1, 2, 3)"));
        assert_eq!(safe_color("Teal"), Some("Teal"));
    }

    #[test]
    fn safe_color_rejects_injection() {
        assert_eq!(safe_color("red; background: url(x)"), None);
        assert_eq!(safe_color("#ff00zz"), None);
        assert_eq!(safe_color("rgb(1,2,3"), None);
        assert_eq!(safe_color("expression(alert(1))"), None);
    }

    #[test]
    fn safe_language_tag_strips_unsafe_characters() {
        assert_eq!(safe_language_tag("Rust").as_deref(), Some("rust"));
        assert_eq!(safe_language_tag("c++").as_deref(), Some("c++"));
        assert_eq!(safe_language_tag("\"><script>").as_deref(), Some("script"));
        assert_eq!(safe_language_tag("  "), None);
    }
}
