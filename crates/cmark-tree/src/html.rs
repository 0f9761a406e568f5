//! HTML re-parsing support.
//!
//! Serialized output may contain raw-HTML spans whose markup only becomes a
//! single element once the text is parsed again. This module reads HTML
//! back into the element tree with scraper.

use scraper::{ElementRef, Html, Node as ScraperNode};

use cmark_tree_core::escape::escape_html;
use cmark_tree_core::{Element, Fragment};

use crate::toc::{headings, Heading};

/// Parse an HTML fragment into an element tree wrapped in `root_tag`.
///
/// The parser decodes character references; text and attribute values are
/// escaped again when stored, so serializing the tree reproduces the
/// decoded content exactly.
///
/// # Example
///
/// ```rust
/// use cmark_tree::{parse_html, serialize, OutputFormat};
///
/// let root = parse_html("<p>a <span>b</span></p>", "div");
/// assert_eq!(
///     serialize(&root, OutputFormat::Html),
///     "<div><p>a <span>b</span></p></div>"
/// );
/// ```
pub fn parse_html(html: &str, root_tag: &str) -> Element {
    let document = Html::parse_fragment(html);
    let mut root = Element::new(root_tag);
    root.append_mixed(convert_children(document.root_element()));
    root
}

/// Collect headings from serialized HTML.
///
/// Unlike [`headings`], this sees elements that were split across several
/// raw-HTML spans during rendering.
pub fn headings_from_html(html: &str) -> Vec<Heading> {
    headings(&parse_html(html, "div"))
}

fn convert_children(element: ElementRef) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                fragments.push(Fragment::escaped(escape_html(&text.text)));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    fragments.push(convert_element(child_element).into());
                }
            }
            _ => {}
        }
    }
    fragments
}

fn convert_element(element: ElementRef) -> Element {
    let mut converted = Element::new(element.value().name());
    for (name, value) in element.value().attrs() {
        converted.set_attr(name, escape_html(value));
    }
    converted.append_mixed(convert_children(element));
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmark_tree_core::{serialize, OutputFormat};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_html() {
        let root = parse_html("<p>Hello <em>World</em></p>", "div");
        assert_eq!(root.tag, "div");
        assert_eq!(root.children[0].tag, "p");
        assert_eq!(root.text_content(), "Hello World");
    }

    #[test]
    fn test_text_is_escaped_again() {
        let root = parse_html("<p>a &amp; b &lt;c&gt;</p>", "section");
        assert_eq!(
            serialize(&root, OutputFormat::Xhtml),
            "<section><p>a &amp; b &lt;c&gt;</p></section>"
        );
    }

    #[test]
    fn test_decoded_references_round_trip() {
        let html = "<p title=\"&amp;lt;x&amp;gt;\">&amp;lt;b&amp;gt; &amp;amp; &copy;</p>";
        let root = parse_html(html, "div");
        assert_eq!(
            serialize(&root, OutputFormat::Xhtml),
            "<div><p title=\"&amp;lt;x&amp;gt;\">&amp;lt;b&amp;gt; &amp;amp; ©</p></div>"
        );
        assert_eq!(root.children[0].attr("title"), Some("&amp;lt;x&amp;gt;"));
    }

    #[test]
    fn test_attributes_survive() {
        let root = parse_html("<a href=\"/x\" title=\"T\">x</a>", "div");
        let link = &root.children[0];
        assert_eq!(link.attr("href"), Some("/x"));
        assert_eq!(link.attr("title"), Some("T"));
    }

    #[test]
    fn test_headings_from_split_spans() {
        let found = headings_from_html("<h2><span class=\"x\">Q&amp;A</span></h2>\n<p>body</p>");
        assert_eq!(
            found,
            vec![Heading {
                level: 2,
                title: "Q&A".to_string()
            }]
        );
    }
}
