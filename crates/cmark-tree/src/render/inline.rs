//! Inline rendering.

use cmark_tree_core::escape::{escape_code, escape_text, escape_url};
use cmark_tree_core::{Element, Fragment, Inline, Span, Text};

use super::Renderer;

impl Renderer {
    pub(super) fn render_inlines(&self, inlines: &[Inline]) -> Vec<Fragment> {
        inlines.iter().map(|inline| self.render_inline(inline)).collect()
    }

    fn render_inline(&self, inline: &Inline) -> Fragment {
        match inline {
            Inline::RawText(content) => Fragment::escaped(escape_text(content)),
            Inline::Strong(content) => self.wrap("strong", content).into(),
            Inline::Emphasis(content) => self.wrap("em", content).into(),
            Inline::Strikethrough(content) => self.wrap("del", content).into(),
            Inline::InlineCode(code) => {
                let mut el = Element::new("code");
                el.append_text(Span::escaped(escape_code(code)));
                el.into()
            }
            Inline::Link {
                target,
                title,
                content,
            } => {
                let mut el = Element::new("a");
                el.set_attr("href", escape_url(target));
                set_title(&mut el, title.as_deref());
                el.append_mixed(self.render_inlines(content));
                el.into()
            }
            Inline::Image {
                src,
                title,
                content,
            } => {
                let mut el = Element::new("img");
                el.set_attr("src", src.as_str());
                el.set_attr("alt", render_to_plain(content));
                set_title(&mut el, title.as_deref());
                el.into()
            }
            Inline::AutoLink {
                target,
                mailto,
                content,
            } => {
                let href = if *mailto {
                    format!("mailto:{}", target)
                } else {
                    escape_url(target)
                };
                let mut el = Element::new("a");
                el.set_attr("href", href);
                el.append_mixed(self.render_inlines(content));
                el.into()
            }
            Inline::EscapeSequence(content) => Fragment::Group(self.render_inlines(content)),
            Inline::LineBreak { soft: true } => Fragment::escaped("\n"),
            Inline::LineBreak { soft: false } => {
                let mut br = Element::new("br");
                br.set_tail(Text::plain("\n"));
                br.into()
            }
            // Left as raw markup: an element split across several spans is
            // only recognized by whoever re-parses the serialized HTML.
            Inline::HtmlSpan(html) => Element::unsafe_text(html.as_str()).into(),
        }
    }

    fn wrap(&self, tag: &str, content: &[Inline]) -> Element {
        let mut el = Element::new(tag);
        el.append_mixed(self.render_inlines(content));
        el
    }
}

fn set_title(el: &mut Element, title: Option<&str>) {
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        el.set_attr("title", escape_text(title));
    }
}

/// Flatten inline content to escaped text with all markup stripped
pub(crate) fn render_to_plain(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain(inlines, &mut out);
    out
}

fn push_plain(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::RawText(content) | Inline::InlineCode(content) | Inline::HtmlSpan(content) => {
                out.push_str(&escape_text(content))
            }
            Inline::Strong(content)
            | Inline::Emphasis(content)
            | Inline::Strikethrough(content)
            | Inline::EscapeSequence(content)
            | Inline::Link { content, .. }
            | Inline::Image { content, .. }
            | Inline::AutoLink { content, .. } => push_plain(content, out),
            Inline::LineBreak { .. } => out.push('\n'),
        }
    }
}
