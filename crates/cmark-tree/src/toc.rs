//! Heading collection for table-of-contents builders.

use cmark_tree_core::escape::unescape;
use cmark_tree_core::utilities::heading_level;
use cmark_tree_core::{Element, Text};

/// A heading found in rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    /// Plain title with character references resolved
    pub title: String,
}

/// Collect `h1`..`h6` elements of a rendered tree in document order.
///
/// Raw-HTML fragments inside a heading are skipped; use
/// [`headings_from_html`](crate::headings_from_html) to recover titles
/// whose markup was split across raw-HTML spans.
pub fn headings(root: &Element) -> Vec<Heading> {
    let mut found = Vec::new();
    collect(root, &mut found);
    found
}

fn collect(element: &Element, found: &mut Vec<Heading>) {
    if let Some(level) = heading_level(&element.tag) {
        let mut title = String::new();
        push_title(element, &mut title);
        found.push(Heading {
            level,
            title: title.trim().to_string(),
        });
        return;
    }
    for child in &element.children {
        collect(child, found);
    }
}

fn push_title(element: &Element, out: &mut String) {
    if !element.is_unsafe() {
        if let Some(text) = &element.text {
            push_text(text, out);
        }
    }
    for child in &element.children {
        push_title(child, out);
        if let Some(tail) = &child.tail {
            push_text(tail, out);
        }
    }
}

fn push_text(text: &Text, out: &mut String) {
    for span in text.spans() {
        if span.escaped {
            out.push_str(&unescape(&span.value));
        } else {
            out.push_str(&span.value);
        }
    }
}
