//! Markdown source to CommonMark tokens, via pulldown-cmark.
//!
//! pulldown-cmark produces a flat event stream. The [`Builder`] keeps a
//! stack of open containers and folds events into the closed [`Block`] and
//! [`Inline`] enums. Two differences from the event model matter:
//!
//! - tight list items carry no paragraph events; their inline runs are
//!   grouped into synthesized paragraphs, and a list is loose as soon as one
//!   of its items saw an explicit paragraph;
//! - character references are resolved by the parser, so `&` is encoded
//!   again in text, titles and targets to keep tokens in source form.

use indexmap::IndexMap;
use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Options, Parser, Tag};

use cmark_tree_core::{
    Block, CellAlign, Document, Error, Inline, LinkDefinition, List, ListItem, Result, Table,
    TableCell, TableRow,
};

/// Parser extensions matching the token kinds the renderer knows
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Parse Markdown source into a token document.
///
/// Link reference definitions become the document's footnote map.
pub fn parse(source: &str) -> Result<Document> {
    let parser = Parser::new_ext(source, parser_options());

    let footnotes: IndexMap<String, LinkDefinition> = parser
        .reference_definitions()
        .iter()
        .map(|(label, definition)| {
            let title = definition
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(encode_ampersands);
            (
                label.to_string(),
                LinkDefinition {
                    target: encode_ampersands(&definition.dest),
                    title,
                },
            )
        })
        .collect();

    let mut builder = Builder::new();
    for event in parser {
        builder.event(event)?;
    }

    let mut document = builder.finish()?;
    document.footnotes = footnotes;
    Ok(document)
}

fn encode_ampersands(text: &str) -> String {
    text.replace('&', "&amp;")
}

fn cell_align(alignment: Alignment) -> Result<CellAlign> {
    let code = match alignment {
        Alignment::None | Alignment::Left => None,
        Alignment::Center => Some(0),
        Alignment::Right => Some(1),
    };
    CellAlign::from_code(code)
}

/// Inline containers closed by a matching end event
#[derive(Debug)]
enum InlineKind {
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        target: String,
        title: Option<String>,
    },
    AutoLink {
        target: String,
        mailto: bool,
    },
    Image {
        src: String,
        title: Option<String>,
    },
}

/// An open container on the builder stack
#[derive(Debug)]
enum Frame {
    Document(Vec<Block>),
    BlockQuote(Vec<Block>),
    List(List),
    Item {
        blocks: Vec<Block>,
        /// Inline run of a tight item, not yet wrapped in a paragraph
        pending: Vec<Inline>,
        explicit_paragraph: bool,
    },
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    HtmlBlock(String),
    Table {
        alignments: Vec<CellAlign>,
        table: Table,
    },
    TableHead(Vec<TableCell>),
    TableRow(Vec<TableCell>),
    TableCell(Vec<Inline>),
    Inline(InlineKind, Vec<Inline>),
}

impl Frame {
    fn name(&self) -> &'static str {
        match self {
            Frame::Document(_) => "document",
            Frame::BlockQuote(_) => "block quote",
            Frame::List(_) => "list",
            Frame::Item { .. } => "list item",
            Frame::Paragraph(_) => "paragraph",
            Frame::Heading { .. } => "heading",
            Frame::CodeBlock { .. } => "code block",
            Frame::HtmlBlock(_) => "html block",
            Frame::Table { .. } => "table",
            Frame::TableHead(_) => "table head",
            Frame::TableRow(_) => "table row",
            Frame::TableCell(_) => "table cell",
            Frame::Inline(..) => "inline",
        }
    }
}

/// Folds pulldown-cmark events into a [`Document`]
#[derive(Debug)]
struct Builder {
    stack: Vec<Frame>,
}

impl Builder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::Document(Vec::new())],
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::InlineCode(code.to_string())),
            Event::Html(html) => match self.stack.last_mut() {
                Some(Frame::HtmlBlock(buffer)) => {
                    buffer.push_str(&html);
                    Ok(())
                }
                _ => self.push_block(Block::HtmlBlock(html.trim_end_matches('\n').to_string())),
            },
            Event::InlineHtml(html) => self.push_inline(Inline::HtmlSpan(html.to_string())),
            Event::SoftBreak => self.push_inline(Inline::LineBreak { soft: true }),
            Event::HardBreak => self.push_inline(Inline::LineBreak { soft: false }),
            Event::Rule => self.push_block(Block::ThematicBreak),
            Event::FootnoteReference(label) => Err(Error::UnsupportedToken(format!(
                "footnote reference [^{}]",
                label
            ))),
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                Err(Error::UnsupportedToken("math".to_string()))
            }
            Event::TaskListMarker(_) => {
                Err(Error::UnsupportedToken("task list marker".to_string()))
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<()> {
        let frame = match tag {
            Tag::Paragraph => {
                if let Some(Frame::Item {
                    explicit_paragraph, ..
                }) = self.stack.last_mut()
                {
                    *explicit_paragraph = true;
                }
                Frame::Paragraph(Vec::new())
            }
            Tag::Heading { level, .. } => Frame::Heading {
                level: level as u8,
                content: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::BlockQuote(Vec::new()),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(encode_ampersands)
                    }
                    CodeBlockKind::Indented => None,
                };
                Frame::CodeBlock {
                    language,
                    code: String::new(),
                }
            }
            Tag::HtmlBlock => Frame::HtmlBlock(String::new()),
            Tag::List(start) => Frame::List(List {
                start,
                ..List::default()
            }),
            Tag::Item => Frame::Item {
                blocks: Vec::new(),
                pending: Vec::new(),
                explicit_paragraph: false,
            },
            Tag::Table(alignments) => Frame::Table {
                alignments: alignments
                    .into_iter()
                    .map(cell_align)
                    .collect::<Result<_>>()?,
                table: Table::default(),
            },
            Tag::TableHead => Frame::TableHead(Vec::new()),
            Tag::TableRow => Frame::TableRow(Vec::new()),
            Tag::TableCell => Frame::TableCell(Vec::new()),
            Tag::Emphasis => Frame::Inline(InlineKind::Emphasis, Vec::new()),
            Tag::Strong => Frame::Inline(InlineKind::Strong, Vec::new()),
            Tag::Strikethrough => Frame::Inline(InlineKind::Strikethrough, Vec::new()),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let kind = match link_type {
                    LinkType::Autolink => InlineKind::AutoLink {
                        target: encode_ampersands(&dest_url),
                        mailto: false,
                    },
                    LinkType::Email => InlineKind::AutoLink {
                        target: encode_ampersands(&dest_url),
                        mailto: true,
                    },
                    _ => InlineKind::Link {
                        target: encode_ampersands(&dest_url),
                        title: non_empty(&title),
                    },
                };
                Frame::Inline(kind, Vec::new())
            }
            Tag::Image {
                dest_url, title, ..
            } => Frame::Inline(
                InlineKind::Image {
                    src: encode_ampersands(&dest_url),
                    title: non_empty(&title),
                },
                Vec::new(),
            ),
            other => return Err(Error::UnsupportedToken(format!("{:?}", other))),
        };
        self.stack.push(frame);
        Ok(())
    }

    /// Pop the innermost container and attach it to its parent
    fn close(&mut self) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            return Err(Error::UnsupportedToken(
                "end event without an open container".to_string(),
            ));
        };

        match frame {
            Frame::Document(_) => Err(Error::UnsupportedToken(
                "end event without an open container".to_string(),
            )),
            Frame::BlockQuote(blocks) => self.push_block(Block::BlockQuote(blocks)),
            Frame::List(list) => {
                tracing::trace!(
                    items = list.items.len(),
                    loose = list.loose,
                    "Closed list"
                );
                self.push_block(Block::List(list))
            }
            Frame::Item {
                mut blocks,
                pending,
                explicit_paragraph,
            } => {
                flush_pending(&mut blocks, pending);
                match self.stack.last_mut() {
                    Some(Frame::List(list)) => {
                        list.loose |= explicit_paragraph;
                        list.items.push(ListItem::new(blocks));
                        Ok(())
                    }
                    _ => Err(self.misplaced("list item")),
                }
            }
            Frame::Paragraph(content) => self.push_block(Block::Paragraph(content)),
            Frame::Heading { level, content } => {
                self.push_block(Block::Heading { level, content })
            }
            Frame::CodeBlock { language, code } => {
                self.push_block(Block::CodeBlock { language, code })
            }
            Frame::HtmlBlock(html) => {
                self.push_block(Block::HtmlBlock(html.trim_end_matches('\n').to_string()))
            }
            Frame::Table { table, .. } => self.push_block(Block::Table(table)),
            Frame::TableHead(cells) => match self.stack.last_mut() {
                Some(Frame::Table { table, .. }) => {
                    table.header = Some(TableRow { cells });
                    Ok(())
                }
                _ => Err(self.misplaced("table head")),
            },
            Frame::TableRow(cells) => match self.stack.last_mut() {
                Some(Frame::Table { table, .. }) => {
                    table.rows.push(TableRow { cells });
                    Ok(())
                }
                _ => Err(self.misplaced("table row")),
            },
            Frame::TableCell(content) => {
                let align = self.next_cell_align();
                match self.stack.last_mut() {
                    Some(Frame::TableHead(cells)) | Some(Frame::TableRow(cells)) => {
                        cells.push(TableCell { align, content });
                        Ok(())
                    }
                    _ => Err(self.misplaced("table cell")),
                }
            }
            Frame::Inline(kind, content) => {
                let inline = match kind {
                    InlineKind::Emphasis => Inline::Emphasis(content),
                    InlineKind::Strong => Inline::Strong(content),
                    InlineKind::Strikethrough => Inline::Strikethrough(content),
                    InlineKind::Link { target, title } => Inline::Link {
                        target,
                        title,
                        content,
                    },
                    InlineKind::AutoLink { target, mailto } => Inline::AutoLink {
                        target,
                        mailto,
                        content,
                    },
                    InlineKind::Image { src, title } => Inline::Image {
                        src,
                        title,
                        content,
                    },
                };
                self.push_inline(inline)
            }
        }
    }

    /// Alignment of the cell about to be added to the open row
    fn next_cell_align(&self) -> CellAlign {
        let column = match self.stack.last() {
            Some(Frame::TableHead(cells)) | Some(Frame::TableRow(cells)) => cells.len(),
            _ => 0,
        };
        self.stack
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Table { alignments, .. } => Some(alignments.get(column).copied()),
                _ => None,
            })
            .flatten()
            .unwrap_or_default()
    }

    fn text(&mut self, text: &str) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::CodeBlock { code, .. }) => {
                code.push_str(text);
                Ok(())
            }
            Some(Frame::HtmlBlock(buffer)) => {
                buffer.push_str(text);
                Ok(())
            }
            _ => self.push_inline(Inline::RawText(encode_ampersands(text))),
        }
    }

    fn push_block(&mut self, block: Block) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Document(blocks)) | Some(Frame::BlockQuote(blocks)) => {
                blocks.push(block);
                Ok(())
            }
            Some(Frame::Item {
                blocks, pending, ..
            }) => {
                flush_pending(blocks, std::mem::take(pending));
                blocks.push(block);
                Ok(())
            }
            _ => Err(self.misplaced("block")),
        }
    }

    fn push_inline(&mut self, inline: Inline) -> Result<()> {
        let content = match self.stack.last_mut() {
            Some(Frame::Paragraph(content))
            | Some(Frame::Heading { content, .. })
            | Some(Frame::TableCell(content))
            | Some(Frame::Inline(_, content))
            | Some(Frame::Item {
                pending: content, ..
            }) => content,
            _ => return Err(self.misplaced("inline content")),
        };

        // the parser splits text runs at entities and escapes
        match (content.last_mut(), inline) {
            (Some(Inline::RawText(previous)), Inline::RawText(next)) => previous.push_str(&next),
            (_, inline) => content.push(inline),
        }
        Ok(())
    }

    fn misplaced(&self, what: &str) -> Error {
        let parent = self.stack.last().map_or("nothing", Frame::name);
        Error::UnsupportedToken(format!("{} inside {}", what, parent))
    }

    fn finish(mut self) -> Result<Document> {
        match (self.stack.pop(), self.stack.is_empty()) {
            (Some(Frame::Document(children)), true) => Ok(Document::new(children)),
            (Some(frame), _) => Err(Error::UnsupportedToken(format!(
                "unterminated {}",
                frame.name()
            ))),
            (None, _) => Err(Error::UnsupportedToken("empty event stream".to_string())),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| encode_ampersands(text))
}

/// Wrap the inline run of a tight list item in a paragraph
fn flush_pending(blocks: &mut Vec<Block>, pending: Vec<Inline>) {
    if pending.is_empty() {
        return;
    }
    tracing::trace!(inlines = pending.len(), "Synthesized tight list paragraph");
    blocks.push(Block::Paragraph(pending));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks(source: &str) -> Vec<Block> {
        parse(source).unwrap().children
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            blocks("# Hi *there*\n\ntext"),
            vec![
                Block::Heading {
                    level: 1,
                    content: vec![
                        Inline::text("Hi "),
                        Inline::Emphasis(vec![Inline::text("there")]),
                    ],
                },
                Block::Paragraph(vec![Inline::text("text")]),
            ]
        );
    }

    #[test]
    fn test_tight_list_synthesizes_paragraphs() {
        let result = blocks("- a\n- b\n");
        assert_eq!(
            result,
            vec![Block::List(List {
                start: None,
                loose: false,
                items: vec![
                    ListItem::from_inlines(vec![Inline::text("a")]),
                    ListItem::from_inlines(vec![Inline::text("b")]),
                ],
            })]
        );
    }

    #[test]
    fn test_loose_list() {
        let result = blocks("1. a\n\n2. b\n");
        let Block::List(list) = &result[0] else {
            panic!("expected a list, got {:?}", result);
        };
        assert!(list.loose);
        assert_eq!(list.start, Some(1));
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn test_tight_item_with_nested_list() {
        let result = blocks("- a\n  - b\n");
        let Block::List(list) = &result[0] else {
            panic!("expected a list, got {:?}", result);
        };
        let children = &list.items[0].children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], Block::Paragraph(vec![Inline::text("a")]));
        assert!(matches!(&children[1], Block::List(inner) if !inner.loose));
    }

    #[test]
    fn test_character_references_keep_source_form() {
        assert_eq!(
            blocks("AT&T &amp; &copy;"),
            vec![Block::Paragraph(vec![Inline::text("AT&amp;T &amp; ©")])]
        );
    }

    #[test]
    fn test_code_spans_and_blocks_stay_raw() {
        let result = blocks("`a&b`\n\n```rust extra\nx & y\n```\n");
        assert_eq!(
            result,
            vec![
                Block::Paragraph(vec![Inline::InlineCode("a&b".to_string())]),
                Block::CodeBlock {
                    language: Some("rust".to_string()),
                    code: "x & y\n".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_indented_code_block_has_no_language() {
        let result = blocks("    code\n");
        assert_eq!(
            result,
            vec![Block::CodeBlock {
                language: None,
                code: "code\n".to_string(),
            }]
        );
    }

    #[test]
    fn test_html_block_trailing_newline_removed() {
        let result = blocks("<div class=\"x\">\nraw\n</div>\n");
        assert_eq!(
            result,
            vec![Block::HtmlBlock("<div class=\"x\">\nraw\n</div>".to_string())]
        );
    }

    #[test]
    fn test_links_and_autolinks() {
        let result = blocks("[x](/a?b=1&c=2 \"t\") <http://e.com> <me@e.com>");
        assert_eq!(
            result,
            vec![Block::Paragraph(vec![
                Inline::Link {
                    target: "/a?b=1&amp;c=2".to_string(),
                    title: Some("t".to_string()),
                    content: vec![Inline::text("x")],
                },
                Inline::text(" "),
                Inline::AutoLink {
                    target: "http://e.com".to_string(),
                    mailto: false,
                    content: vec![Inline::text("http://e.com")],
                },
                Inline::text(" "),
                Inline::AutoLink {
                    target: "me@e.com".to_string(),
                    mailto: true,
                    content: vec![Inline::text("me@e.com")],
                },
            ])]
        );
    }

    #[test]
    fn test_image_without_title() {
        let result = blocks("![alt *text*](/i.png)");
        assert_eq!(
            result,
            vec![Block::Paragraph(vec![Inline::Image {
                src: "/i.png".to_string(),
                title: None,
                content: vec![
                    Inline::text("alt "),
                    Inline::Emphasis(vec![Inline::text("text")]),
                ],
            }])]
        );
    }

    #[test]
    fn test_table_alignments() {
        let result = blocks("| a | b | c | d |\n|:--|:-:|--:|---|\n| 1 | 2 | 3 | 4 |\n");
        let Block::Table(table) = &result[0] else {
            panic!("expected a table, got {:?}", result);
        };
        let aligns = |row: &TableRow| row.cells.iter().map(|c| c.align).collect::<Vec<_>>();
        let expected = vec![
            CellAlign::Left,
            CellAlign::Center,
            CellAlign::Right,
            CellAlign::Left,
        ];
        assert_eq!(aligns(table.header.as_ref().unwrap()), expected);
        assert_eq!(aligns(&table.rows[0]), expected);
    }

    #[test]
    fn test_breaks_and_inline_html() {
        let result = blocks("a  \nb\n<span>c</span>");
        assert_eq!(
            result,
            vec![Block::Paragraph(vec![
                Inline::text("a"),
                Inline::LineBreak { soft: false },
                Inline::text("b"),
                Inline::LineBreak { soft: true },
                Inline::HtmlSpan("<span>".to_string()),
                Inline::text("c"),
                Inline::HtmlSpan("</span>".to_string()),
            ])]
        );
    }

    #[test]
    fn test_reference_definitions_become_footnotes() {
        let document = parse("[x][ref]\n\n[ref]: /target \"Title\"\n").unwrap();
        let definition = document.footnotes.values().next().unwrap();
        assert_eq!(definition.target, "/target");
        assert_eq!(definition.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_empty_blockquote() {
        assert_eq!(blocks(">"), vec![Block::BlockQuote(vec![])]);
    }
}
