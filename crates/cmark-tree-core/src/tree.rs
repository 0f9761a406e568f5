//! Element tree produced by the renderer.
//!
//! The tree follows the ElementTree layout: an element owns the text that
//! appears before its first child (`text`) and the text that follows its own
//! closing tag (`tail`). Text is kept as a list of [`Span`]s so that content
//! the renderer already escaped is never merged indistinguishably with
//! ordinary text.

use std::fmt;

use indexmap::IndexMap;

/// A run of text with its escaping state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub value: String,
    /// Already escaped (or verbatim markup): written out as-is
    pub escaped: bool,
}

impl Span {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            escaped: false,
        }
    }

    pub fn escaped(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            escaped: true,
        }
    }
}

/// Text content of an element, or the tail following it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    spans: Vec<Span>,
}

impl Text {
    pub fn plain(value: &str) -> Self {
        let mut text = Self::default();
        text.push(Span::plain(value));
        text
    }

    pub fn escaped(value: &str) -> Self {
        let mut text = Self::default();
        text.push(Span::escaped(value));
        text
    }

    /// Append a span, merging it into the last one when the escaping state
    /// matches
    pub fn push(&mut self, span: Span) {
        if span.value.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.escaped == span.escaped => last.value.push_str(&span.value),
            _ => self.spans.push(span),
        }
    }

    /// Append ordinary text
    pub fn push_str(&mut self, value: &str) {
        self.push(Span::plain(value));
    }

    pub fn append(&mut self, other: Text) {
        for span in other.spans {
            self.push(span);
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Check if any part of the text is already escaped
    pub fn is_escaped(&self) -> bool {
        self.spans.iter().any(|s| s.escaped)
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.value)?;
        }
        Ok(())
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        let mut rest = *other;
        for span in &self.spans {
            match rest.strip_prefix(span.value.as_str()) {
                Some(tail) => rest = tail,
                None => return false,
            }
        }
        rest.is_empty()
    }
}

/// Rendered content waiting to be attached to an element.
///
/// Groups nest arbitrarily and are flattened depth-first by
/// [`Element::append_mixed`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(Span),
    Element(Element),
    Group(Vec<Fragment>),
}

impl Fragment {
    pub fn plain(value: &str) -> Self {
        Fragment::Text(Span::plain(value))
    }

    pub fn escaped(value: impl Into<String>) -> Self {
        Fragment::Text(Span::escaped(value))
    }
}

impl From<Element> for Fragment {
    fn from(element: Element) -> Self {
        Fragment::Element(element)
    }
}

impl From<Vec<Fragment>> for Fragment {
    fn from(fragments: Vec<Fragment>) -> Self {
        Fragment::Group(fragments)
    }
}

/// One output tag.
///
/// An element with an empty tag is a raw-text wrapper: its `text` is written
/// verbatim and it never has children or attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Tag name (lowercase); empty for raw-text wrappers
    pub tag: String,

    /// Attributes; serialized sorted by name
    pub attrs: IndexMap<String, String>,

    /// Content before the first child
    pub text: Option<Text>,

    /// Content after this element's closing tag, owned by the parent stream
    pub tail: Option<Text>,

    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Create a new element with attributes
    pub fn with_attrs(tag: &str, attrs: Vec<(&str, String)>) -> Self {
        let mut element = Self::new(tag);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        element
    }

    /// Wrap raw markup that must be serialized without escaping
    pub fn unsafe_text(raw: impl Into<String>) -> Self {
        Self {
            text: Some(Text {
                spans: vec![Span::escaped(raw)],
            }),
            ..Self::default()
        }
    }

    /// Check if this is a raw-text wrapper
    pub fn is_unsafe(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    pub fn set_text(&mut self, text: Text) {
        self.text = Some(text);
    }

    pub fn set_tail(&mut self, tail: Text) {
        self.tail = Some(tail);
    }

    /// Add a child element
    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Append text to the content stream: into `text` while there are no
    /// children, otherwise into the tail of the last child
    pub fn append_text(&mut self, span: Span) {
        let target = match self.children.last_mut() {
            Some(last) => &mut last.tail,
            None => &mut self.text,
        };
        target.get_or_insert_with(Text::default).push(span);
    }

    /// Splice a mixed sequence of text and elements into this element,
    /// keeping the original order of text, children and tails
    pub fn append_mixed<I>(&mut self, fragments: I) -> &mut Self
    where
        I: IntoIterator<Item = Fragment>,
    {
        for fragment in fragments {
            match fragment {
                Fragment::Text(span) => self.append_text(span),
                Fragment::Element(child) => self.append_child(child),
                Fragment::Group(group) => {
                    self.append_mixed(group);
                }
            }
        }
        self
    }

    /// Append a newline after the last piece of content, if there is any
    pub fn append_newline_inside(&mut self) {
        if let Some(last) = self.children.last_mut() {
            last.tail.get_or_insert_with(Text::default).push_str("\n");
        } else if let Some(text) = self.text.as_mut().filter(|t| !t.is_empty()) {
            text.push_str("\n");
        }
    }

    /// Check if this element has any content
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_ref().map_or(true, Text::is_empty)
    }

    /// Get all text content from this element and its descendants, without
    /// this element's tail. Raw-text wrapper bodies are skipped.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if !self.is_unsafe() {
            if let Some(text) = &self.text {
                out.push_str(&text.to_string());
            }
        }
        for child in &self.children {
            child.collect_text(out);
            if let Some(tail) = &child.tail {
                out.push_str(&tail.to_string());
            }
        }
    }
}
