//! Utility functions and constants for HTML output.

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "isindex",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Placeholder markers reserved by extension pipelines (STX, ETX)
pub const PLACEHOLDER_MARKERS: &[char] = &['\u{0002}', '\u{0003}'];

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a heading (`h1`..`h6`), returning its level
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h' | b'H', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

/// Remove placeholder markers from a source line
pub fn strip_placeholders(line: &str) -> String {
    if line.contains(PLACEHOLDER_MARKERS) {
        line.replace(PLACEHOLDER_MARKERS, "")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_void() {
        assert!(is_void("br"));
        assert!(is_void("img"));
        assert!(is_void("HR"));
        assert!(!is_void("div"));
        assert!(!is_void(""));
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("H6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("h10"), None);
    }

    #[test]
    fn test_strip_placeholders() {
        assert_eq!(strip_placeholders("a\u{2}b\u{3}c"), "abc");
        assert_eq!(strip_placeholders("plain"), "plain");
    }
}
