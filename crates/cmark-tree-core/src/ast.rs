//! CommonMark token model
//!
//! This module defines the tokens a CommonMark parser hands to the renderer.
//! Block and inline kinds are closed enums so the renderer can match on them
//! exhaustively. Text-carrying tokens hold source form: character references
//! are kept as written and resolved by the escaper at render time.

use indexmap::IndexMap;

use crate::{Error, Result};

/// Root of a parsed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Top-level blocks in source order
    pub children: Vec<Block>,

    /// Link reference definitions, keyed by normalized label
    pub footnotes: IndexMap<String, LinkDefinition>,

    /// Wrapper tag requested by the caller, if any
    pub root_tag: Option<String>,
}

impl Document {
    pub fn new(children: Vec<Block>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }
}

/// Target and optional title of a link reference definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDefinition {
    pub target: String,
    pub title: Option<String>,
}

/// A block-level token
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading with level (1-6) and inline content
    Heading { level: u8, content: Vec<Inline> },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Block quote containing nested blocks
    BlockQuote(Vec<Block>),

    /// Ordered or bullet list
    List(List),

    /// Fenced or indented code block
    CodeBlock {
        language: Option<String>,
        code: String,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// Raw HTML block, passed through verbatim
    HtmlBlock(String),

    /// Table with optional header row
    Table(Table),
}

/// An ordered (`start` present) or bullet list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    pub start: Option<u64>,
    pub loose: bool,
    pub items: Vec<ListItem>,
}

/// A list item containing blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self {
            children: vec![Block::Paragraph(inlines)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Option<TableRow>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub align: CellAlign,
    pub content: Vec<Inline>,
}

/// Column alignment of a table cell.
///
/// Parsers encode this as an optional integer: unset is left, `0` is
/// center, `1` is right. No other code exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl CellAlign {
    /// Decode the parser's alignment code
    pub fn from_code(code: Option<i64>) -> Result<Self> {
        match code {
            None => Ok(CellAlign::Left),
            Some(0) => Ok(CellAlign::Center),
            Some(1) => Ok(CellAlign::Right),
            Some(other) => Err(Error::UnsupportedAlignment(other)),
        }
    }

    /// Value of the `align` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            CellAlign::Left => "left",
            CellAlign::Center => "center",
            CellAlign::Right => "right",
        }
    }
}

/// An inline token
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Run of source text
    RawText(String),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// Strikethrough (GFM)
    Strikethrough(Vec<Inline>),

    /// Code span
    InlineCode(String),

    /// Link with target, optional title and inline content
    Link {
        target: String,
        title: Option<String>,
        content: Vec<Inline>,
    },

    /// Image with source, optional title and inline alt content
    Image {
        src: String,
        title: Option<String>,
        content: Vec<Inline>,
    },

    /// `<...>` autolink; `mailto` marks an email autolink
    AutoLink {
        target: String,
        mailto: bool,
        content: Vec<Inline>,
    },

    /// Backslash escape, transparent when rendered
    EscapeSequence(Vec<Inline>),

    /// Soft or hard line break
    LineBreak { soft: bool },

    /// Raw inline HTML, passed through verbatim
    HtmlSpan(String),
}

impl Inline {
    pub fn text(content: &str) -> Self {
        Inline::RawText(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_codes() {
        assert_eq!(CellAlign::from_code(None).unwrap(), CellAlign::Left);
        assert_eq!(CellAlign::from_code(Some(0)).unwrap(), CellAlign::Center);
        assert_eq!(CellAlign::from_code(Some(1)).unwrap(), CellAlign::Right);
    }

    #[test]
    fn test_align_rejects_other_codes() {
        assert!(matches!(
            CellAlign::from_code(Some(2)),
            Err(Error::UnsupportedAlignment(2))
        ));
        assert!(matches!(
            CellAlign::from_code(Some(-1)),
            Err(Error::UnsupportedAlignment(-1))
        ));
    }

    #[test]
    fn test_list_item_from_inlines() {
        let item = ListItem::from_inlines(vec![Inline::text("One")]);
        assert_eq!(
            item.children,
            vec![Block::Paragraph(vec![Inline::RawText("One".to_string())])]
        );
    }
}
