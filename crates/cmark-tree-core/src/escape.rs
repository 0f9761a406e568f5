//! HTML and URL escaping
//!
//! Renderer-level escaping normalizes its input first: character references
//! are resolved, then the result is escaped again, so `&amp;` and `&` both
//! come out as `&amp;`. Apostrophes are always emitted literally.
//!
//! Serializer-level escaping ([`escape_cdata`], [`escape_attribute`]) leaves
//! existing character references alone, which makes it safe to apply on top
//! of text the renderer already escaped.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

/// Character references. Named references may omit the trailing `;`.
static CHARREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[^\t\n\f <&#;]{1,32};?)").unwrap()
});

/// Tail of a complete character reference, matched right after an `&`
static ENTITY_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#[0-9]+|#[xX][0-9a-fA-F]+|[0-9A-Za-z]+);").unwrap());

/// Characters `escape_url` keeps as-is besides `A-Za-z0-9_.-~`
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/')
    .remove(b'#')
    .remove(b':')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'?')
    .remove(b'=')
    .remove(b'%')
    .remove(b'@')
    .remove(b'+')
    .remove(b',')
    .remove(b'&');

/// Named references HTML resolves even without a trailing `;`
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Resolve character references in `raw`.
///
/// Unknown references are left untouched. Numeric references resolve the
/// way HTML parsers do: `&#128;`..`&#159;` through Windows-1252, surrogates
/// and out-of-range values to U+FFFD, other control characters and
/// noncharacters to nothing.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    CHARREF.replace_all(raw, |caps: &Captures| {
        let reference = &caps[1];
        match reference.strip_prefix('#') {
            Some(number) => resolve_numeric(number),
            None => resolve_named(reference),
        }
    })
}

/// Numeric references `&#128;`..`&#159;` name Windows-1252 characters
const WINDOWS_1252: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

fn resolve_numeric(number: &str) -> String {
    let number = number.trim_end_matches(';');
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse::<u32>(),
    };
    let Ok(code) = code else {
        return char::REPLACEMENT_CHARACTER.to_string();
    };

    match code {
        0 | 0xD800..=0xDFFF | 0x11_0000..=u32::MAX => char::REPLACEMENT_CHARACTER.to_string(),
        0x0D => "\r".to_string(),
        0x80..=0x9F => WINDOWS_1252[(code - 0x80) as usize].to_string(),
        _ if is_disallowed_code_point(code) => String::new(),
        _ => char::from_u32(code)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string(),
    }
}

/// Control characters and noncharacters, dropped when referenced
fn is_disallowed_code_point(code: u32) -> bool {
    matches!(code, 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF)
        || code & 0xFFFE == 0xFFFE
}

fn resolve_named(reference: &str) -> String {
    if let Some(resolved) = lookup_named(reference) {
        return resolved;
    }

    // longest legacy name that prefixes the reference
    let prefix = LEGACY_ENTITIES
        .iter()
        .filter(|name| name.len() < reference.len() && reference.starts_with(**name))
        .max_by_key(|name| name.len());

    match prefix.and_then(|name| lookup_named(name).map(|c| (name.len(), c))) {
        Some((len, resolved)) => resolved + &reference[len..],
        None => format!("&{}", reference),
    }
}

fn lookup_named(name: &str) -> Option<String> {
    let reference = match name.strip_suffix(';') {
        Some(_) => format!("&{}", name),
        None if LEGACY_ENTITIES.contains(&name) => format!("&{};", name),
        None => return None,
    };
    match html_escape::decode_html_entities(&reference) {
        Cow::Owned(decoded) if decoded != reference => Some(decoded),
        _ => None,
    }
}

/// Escape `&`, `<`, `>` and `"`, keeping apostrophes literal.
///
/// Every `&` is escaped, including one that starts a character reference.
/// Use it for text that is already decoded.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).replace("&#x27;", "'")
}

/// Normalize and escape a run of text or an attribute value.
///
/// The input is unescaped first so that references are never double
/// encoded.
pub fn escape_text(raw: &str) -> String {
    escape_html(&unescape(raw))
}

/// Escape the content of a code span. References are kept literally.
pub fn escape_code(code: &str) -> String {
    escape_html(code)
}

/// Escape the content of a code block.
///
/// Double quotes stay literal as well, for consumers that re-parse code
/// blocks (syntax highlighters).
pub fn escape_block_code(code: &str) -> String {
    escape_html(code).replace("&quot;", "\"")
}

/// Percent-encode a link target and escape it for an attribute value.
///
/// `/#:()*?=%@+,&` keep their meaning and are not encoded.
pub fn escape_url(raw: &str) -> String {
    let unescaped = unescape(raw);
    let encoded = utf8_percent_encode(&unescaped, URL_ENCODE_SET).to_string();
    html_escape::encode_double_quoted_attribute(&encoded).into_owned()
}

/// Escape character data for serialization.
///
/// An `&` that starts a complete character reference is kept.
pub fn escape_cdata(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    push_escaped(text, false, &mut out);
    Cow::Owned(out)
}

/// Escape an attribute value for serialization
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\n']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    push_escaped(value, true, &mut out);
    Cow::Owned(out)
}

fn push_escaped(text: &str, attribute: bool, out: &mut String) {
    for (i, c) in text.char_indices() {
        match c {
            '&' if ENTITY_TAIL.is_match(&text[i + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
}
