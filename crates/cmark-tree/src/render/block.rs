//! Block-level rendering.

use cmark_tree_core::escape::{escape_block_code, escape_text};
use cmark_tree_core::{
    Block, Element, Fragment, Inline, List, ListItem, Span, Table, TableCell, TableRow, Text,
};

use super::Renderer;

impl Renderer {
    pub(super) fn render_block(&mut self, block: &Block) -> Fragment {
        match block {
            Block::Heading { level, content } => self.render_heading(*level, content).into(),
            Block::Paragraph(content) => self.render_paragraph(content),
            Block::BlockQuote(blocks) => self.render_quote(blocks).into(),
            Block::List(list) => self.render_list(list).into(),
            Block::CodeBlock { language, code } => {
                render_block_code(language.as_deref(), code).into()
            }
            Block::ThematicBreak => Element::new("hr").into(),
            Block::HtmlBlock(html) => Element::unsafe_text(html.as_str()).into(),
            Block::Table(table) => self.render_table(table).into(),
        }
    }

    fn render_heading(&self, level: u8, content: &[Inline]) -> Element {
        let mut el = Element::new(&format!("h{}", level.clamp(1, 6)));
        el.append_mixed(self.render_inlines(content));
        el
    }

    fn render_paragraph(&self, content: &[Inline]) -> Fragment {
        if self.suppressing_paragraphs() {
            // tight context: inline content goes straight into the parent
            return Fragment::Group(self.render_inlines(content));
        }
        let mut el = Element::new("p");
        el.append_mixed(self.render_inlines(content));
        el.into()
    }

    fn render_quote(&mut self, blocks: &[Block]) -> Element {
        let mut el = Element::new("blockquote");
        el.set_text(Text::plain("\n"));

        let inner = self.with_suppression(false, |r| r.render_blocks_joined(blocks));
        el.append_mixed(inner);
        el.append_newline_inside();

        // ">" alone renders one newline, not two
        if el.children.is_empty() && el.text.as_ref().is_some_and(|t| *t == "\n\n") {
            el.set_text(Text::plain("\n"));
        }
        el
    }

    fn render_list(&mut self, list: &List) -> Element {
        let mut el = match list.start {
            Some(start) => {
                let mut ol = Element::new("ol");
                if start != 1 {
                    ol.set_attr("start", start.to_string());
                }
                ol
            }
            None => Element::new("ul"),
        };
        el.set_text(Text::plain("\n"));

        let inner = self.with_suppression(!list.loose, |r| {
            let mut fragments = Vec::with_capacity(list.items.len() * 2);
            for (i, item) in list.items.iter().enumerate() {
                if i > 0 {
                    fragments.push(Fragment::plain("\n"));
                }
                fragments.push(r.render_list_item(item).into());
            }
            fragments
        });
        el.append_mixed(inner);
        el.append_newline_inside();
        el
    }

    fn render_list_item(&mut self, item: &ListItem) -> Element {
        let mut el = Element::new("li");
        let (Some(first), Some(last)) = (item.children.first(), item.children.last()) else {
            return el;
        };

        let tight = self.suppressing_paragraphs();
        let mut inner = Vec::with_capacity(3);
        if !(tight && matches!(first, Block::Paragraph(_))) {
            inner.push(Fragment::plain("\n"));
        }
        inner.push(Fragment::Group(self.render_blocks_joined(&item.children)));
        if !(tight && matches!(last, Block::Paragraph(_))) {
            inner.push(Fragment::plain("\n"));
        }

        el.append_mixed(inner);
        el
    }

    fn render_table(&self, table: &Table) -> Element {
        let mut el = Element::new("table");
        el.set_text(Text::plain("\n"));

        if let Some(header) = &table.header {
            let mut thead = Element::new("thead");
            thead.set_text(Text::plain("\n"));
            thead.set_tail(Text::plain("\n"));
            thead.append_child(self.render_table_row(header, true));
            el.append_child(thead);
        }

        let mut tbody = Element::new("tbody");
        tbody.set_text(Text::plain("\n"));
        tbody.set_tail(Text::plain("\n"));
        tbody.append_mixed(
            table
                .rows
                .iter()
                .map(|row| Fragment::Element(self.render_table_row(row, false))),
        );
        el.append_child(tbody);
        el
    }

    fn render_table_row(&self, row: &TableRow, header: bool) -> Element {
        let mut el = Element::new("tr");
        el.set_text(Text::plain("\n"));
        el.set_tail(Text::plain("\n"));
        el.append_mixed(
            row.cells
                .iter()
                .map(|cell| Fragment::Element(self.render_table_cell(cell, header))),
        );
        el
    }

    fn render_table_cell(&self, cell: &TableCell, header: bool) -> Element {
        let mut el = Element::new(if header { "th" } else { "td" });
        el.set_tail(Text::plain("\n"));
        el.set_attr("align", cell.align.as_str());
        el.append_mixed(self.render_inlines(&cell.content));
        el
    }
}

fn render_block_code(language: Option<&str>, code: &str) -> Element {
    let mut code_el = Element::new("code");
    if let Some(language) = language.filter(|l| !l.is_empty()) {
        code_el.set_attr("class", format!("language-{}", escape_text(language)));
    }
    code_el.append_text(Span::escaped(escape_block_code(code)));

    let mut pre = Element::new("pre");
    pre.append_child(code_el);
    pre
}
