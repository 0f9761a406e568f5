//! Token renderer: CommonMark tokens to an element tree.

mod block;
mod inline;

use indexmap::IndexMap;

use cmark_tree_core::{
    Block, Document, Element, Error, Fragment, LinkDefinition, Result, DEFAULT_ROOT_TAG,
};

/// Renders one document into one element tree.
///
/// A renderer carries per-document state (the paragraph suppression stack
/// and the merged footnote map); use a fresh instance for every document.
#[derive(Debug)]
pub struct Renderer {
    /// Top of stack: whether paragraphs render without a `<p>` wrapper.
    /// Never empty.
    suppress_paragraphs: Vec<bool>,
    footnotes: IndexMap<String, LinkDefinition>,
    root_tag: String,
}

impl Renderer {
    /// Create a renderer wrapping documents in `<div>`
    pub fn new() -> Self {
        Self::with_root_tag(DEFAULT_ROOT_TAG)
    }

    /// Create a renderer with a custom wrapper tag
    pub fn with_root_tag(root_tag: &str) -> Self {
        Self {
            suppress_paragraphs: vec![false],
            footnotes: IndexMap::new(),
            root_tag: root_tag.to_string(),
        }
    }

    /// Render a document into a wrapper element.
    ///
    /// The document's own `root_tag`, when set, takes precedence over the
    /// renderer's. An empty tag is rejected: it is reserved for raw-text
    /// wrappers, whose children are never serialized.
    pub fn render_document(&mut self, document: &Document) -> Result<Element> {
        let tag = document.root_tag.as_deref().unwrap_or(&self.root_tag);
        if tag.trim().is_empty() {
            return Err(Error::InvalidRootTag(tag.to_string()));
        }
        let mut root = Element::new(tag);

        self.footnotes.extend(
            document
                .footnotes
                .iter()
                .map(|(label, definition)| (label.clone(), definition.clone())),
        );

        let inner = self.render_blocks_joined(&document.children);
        root.append_mixed(inner);
        root.append_newline_inside();
        Ok(root)
    }

    /// Link reference definitions merged from every rendered document
    pub fn footnotes(&self) -> &IndexMap<String, LinkDefinition> {
        &self.footnotes
    }

    pub fn into_footnotes(self) -> IndexMap<String, LinkDefinition> {
        self.footnotes
    }

    fn suppressing_paragraphs(&self) -> bool {
        self.suppress_paragraphs.last().copied().unwrap_or(false)
    }

    /// Run `f` with paragraph suppression set to `suppress`
    fn with_suppression<T>(&mut self, suppress: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        self.suppress_paragraphs.push(suppress);
        let result = f(self);
        self.suppress_paragraphs.pop();
        result
    }

    /// Render blocks with a newline between siblings
    fn render_blocks_joined(&mut self, blocks: &[Block]) -> Vec<Fragment> {
        let mut fragments = Vec::with_capacity(blocks.len() * 2);
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                fragments.push(Fragment::plain("\n"));
            }
            fragments.push(self.render_block(block));
        }
        fragments
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmark_tree_core::{serialize, Inline, List, ListItem, OutputFormat};
    use pretty_assertions::assert_eq;

    fn render(blocks: Vec<Block>) -> String {
        let mut renderer = Renderer::new();
        let root = renderer
            .render_document(&Document::new(blocks))
            .unwrap();
        serialize(&root, OutputFormat::Xhtml)
    }

    #[test]
    fn test_document_joins_blocks() {
        let result = render(vec![
            Block::Heading {
                level: 1,
                content: vec![Inline::text("Title")],
            },
            Block::Paragraph(vec![Inline::text("Body")]),
        ]);
        assert_eq!(result, "<div><h1>Title</h1>\n<p>Body</p>\n</div>");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(vec![]), "<div></div>");
    }

    #[test]
    fn test_document_root_tag() {
        let mut document = Document::new(vec![Block::ThematicBreak]);
        document.root_tag = Some("section".to_string());

        let mut renderer = Renderer::with_root_tag("article");
        let root = renderer.render_document(&document).unwrap();
        assert_eq!(root.tag, "section");

        let root = renderer.render_document(&Document::new(vec![])).unwrap();
        assert_eq!(root.tag, "article");
    }

    #[test]
    fn test_empty_root_tag_is_rejected() {
        let mut renderer = Renderer::with_root_tag("");
        let err = renderer
            .render_document(&Document::new(vec![Block::ThematicBreak]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRootTag(ref tag) if tag.is_empty()));

        let mut document = Document::new(vec![Block::ThematicBreak]);
        document.root_tag = Some(String::new());
        let err = Renderer::new().render_document(&document).unwrap_err();
        assert!(matches!(err, Error::InvalidRootTag(_)));
    }

    #[test]
    fn test_footnotes_are_merged() {
        let mut first = Document::default();
        first.footnotes.insert(
            "a".to_string(),
            LinkDefinition {
                target: "/a".to_string(),
                title: None,
            },
        );
        let mut second = Document::default();
        second.footnotes.insert(
            "b".to_string(),
            LinkDefinition {
                target: "/b".to_string(),
                title: Some("B".to_string()),
            },
        );

        let mut renderer = Renderer::new();
        renderer.render_document(&first).unwrap();
        renderer.render_document(&second).unwrap();

        let labels: Vec<_> = renderer.footnotes().keys().cloned().collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_suppression_stack_is_restored() {
        let mut renderer = Renderer::new();
        let list = Block::List(List {
            start: None,
            loose: false,
            items: vec![ListItem::from_inlines(vec![Inline::text("x")])],
        });
        renderer.render_document(&Document::new(vec![list])).unwrap();
        assert_eq!(renderer.suppress_paragraphs, vec![false]);
    }
}
