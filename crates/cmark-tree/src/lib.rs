//! # cmark-tree
//!
//! Render CommonMark into an element tree and serialize it as HTML or XHTML.
//!
//! Markdown source is parsed with [pulldown-cmark](https://docs.rs/pulldown-cmark)
//! into the closed token enums of [`cmark_tree_core`], rendered into an
//! ElementTree-style tree, and serialized. Between those stages,
//! [`Extension`]s may rewrite the source lines, the tree and the output.
//!
//! ## Design
//!
//! - **Escape once**: tokens hold source text; every character reference is
//!   resolved and re-escaped exactly once, at render time
//! - **Raw HTML passthrough**: HTML blocks and spans are kept as verbatim
//!   islands that the serializer never escapes
//! - **No shared render state**: each conversion uses its own renderer
//!
//! ## Example
//!
//! ```rust
//! use cmark_tree::Markdown;
//!
//! let md = Markdown::new();
//! let html = md.convert("# Hi *there*\n\nSee [x](http://e.com \"t\").").unwrap();
//! assert_eq!(
//!     html,
//!     "<h1>Hi <em>there</em></h1>\n<p>See <a href=\"http://e.com\" title=\"t\">x</a>.</p>"
//! );
//! ```
//!
//! ## Example (token document)
//!
//! ```rust
//! use cmark_tree::{Block, Document, Inline, Markdown};
//!
//! let document = Document::new(vec![Block::Paragraph(vec![Inline::text("AT&T")])]);
//! let html = Markdown::new().convert_document(&document).unwrap();
//! assert_eq!(html, "<p>AT&amp;T</p>");
//! ```

mod extension;
#[cfg(feature = "html")]
pub mod html;
mod parse;
mod render;
mod service;
mod toc;

pub use cmark_tree_core::escape;
pub use cmark_tree_core::{
    serialize, strip_root, Block, CellAlign, Document, Element, Error, Fragment, Inline,
    LinkDefinition, List, ListItem, OutputFormat, Result, Span, Table, TableCell, TableRow, Text,
    DEFAULT_ROOT_TAG,
};
pub use extension::{Extension, ExtensionConfig, FnExtension};
#[cfg(feature = "html")]
pub use html::{headings_from_html, parse_html};
pub use parse::{parse, parser_options};
pub use render::Renderer;
pub use service::{Markdown, MarkdownOptions, Rendered};
pub use toc::{headings, Heading};
