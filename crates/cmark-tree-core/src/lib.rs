//! cmark-tree-core - CommonMark tokens, element tree and HTML serialization
//!
//! This crate provides the data structures shared by the renderer in
//! `cmark-tree`: the token model a CommonMark parser hands over, the
//! intermediate element tree the renderer builds, and the serializer that
//! turns that tree into HTML or XHTML text.
//!
//! # Architecture
//!
//! ```text
//!                ┌──────────┐      ┌──────────────┐
//! Document ────▶ │ Renderer │ ───▶ │ Element tree │ ──serialize──▶ HTML String
//! (tokens)       └──────────┘      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use cmark_tree_core::{serialize, Element, Fragment, OutputFormat};
//!
//! let mut p = Element::new("p");
//! p.append_mixed(vec![
//!     Fragment::escaped("Hello "),
//!     Fragment::Element(Element::new("br")),
//!     Fragment::escaped("World"),
//! ]);
//!
//! assert_eq!(serialize(&p, OutputFormat::Xhtml), "<p>Hello <br />World</p>");
//! ```

pub mod ast;
pub mod escape;
mod options;
mod serialize;
pub mod tree;
pub mod utilities;

pub use ast::{
    Block, CellAlign, Document, Inline, LinkDefinition, List, ListItem, Table, TableCell,
    TableRow,
};
pub use options::{OutputFormat, DEFAULT_ROOT_TAG};
pub use serialize::{serialize, strip_root};
pub use tree::{Element, Fragment, Span, Text};

/// Error type for rendering and serialization
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The wrapper element could not be located in serialized output.
    #[error("failed to strip top-level <{tag}> tags from output: {output:?}")]
    MalformedTree { tag: String, output: String },

    /// The parser produced a construct that has no token kind.
    #[error("unsupported token: {0}")]
    UnsupportedToken(String),

    /// The wrapper tag is empty, which would make the root a raw-text
    /// wrapper and drop the whole document.
    #[error("invalid root tag: {0:?}")]
    InvalidRootTag(String),

    #[error("unsupported table cell alignment: {0}")]
    UnsupportedAlignment(i64),

    #[error("unknown output format: {0:?} (expected \"html\" or \"xhtml\")")]
    UnknownOutputFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
