//! Markdown - the main entry point for Markdown to HTML conversion.

use indexmap::IndexMap;

use cmark_tree_core::utilities::strip_placeholders;
use cmark_tree_core::{
    serialize, strip_root, Document, LinkDefinition, OutputFormat, Result, DEFAULT_ROOT_TAG,
};

use crate::extension::{Extension, ExtensionConfig};
use crate::parse::parse;
use crate::render::Renderer;
use crate::toc::{headings, Heading};

/// Options for Markdown
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Serialization conventions for void elements
    pub output_format: OutputFormat,

    /// Wrapper tag enclosing the rendered document
    pub root_tag: String,

    /// Remove the wrapper tag from the output
    pub strip_root: bool,

    /// Options handed to registered extensions, keyed by extension name
    pub extension_configs: IndexMap<String, ExtensionConfig>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Xhtml,
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            strip_root: true,
            extension_configs: IndexMap::new(),
        }
    }
}

/// Output of one conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub html: String,
    /// Link reference definitions seen while rendering
    pub footnotes: IndexMap<String, LinkDefinition>,
    pub headings: Vec<Heading>,
}

/// The main service for converting Markdown to HTML.
///
/// The service holds configuration and extensions only. Every conversion
/// builds its own renderer and tree, so a shared `&Markdown` can convert
/// documents from several threads.
pub struct Markdown {
    options: MarkdownOptions,
    extensions: Vec<Box<dyn Extension>>,
}

impl Markdown {
    /// Create a new Markdown service with default options
    pub fn new() -> Self {
        Self::with_options(MarkdownOptions::default())
    }

    /// Create a Markdown service with custom options
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self {
            options,
            extensions: Vec::new(),
        }
    }

    /// Register an extension, builder style
    pub fn with_extension(mut self, extension: impl Extension + 'static) -> Self {
        self.add_extension(extension);
        self
    }

    /// Register an extension.
    ///
    /// The extension receives its entry from `extension_configs`, if any.
    pub fn add_extension(&mut self, mut extension: impl Extension + 'static) -> &mut Self {
        if let Some(config) = self.options.extension_configs.get(extension.name()) {
            extension.configure(config);
        }
        self.extensions.push(Box::new(extension));
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut MarkdownOptions {
        &mut self.options
    }

    /// Names of registered extensions, in registration order
    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|ext| ext.name())
    }

    /// Convert Markdown source to HTML
    pub fn convert(&self, source: &str) -> Result<String> {
        self.render(source).map(|rendered| rendered.html)
    }

    /// Convert Markdown source, keeping footnotes and headings
    pub fn render(&self, source: &str) -> Result<Rendered> {
        if source.trim().is_empty() {
            return Ok(Rendered::default());
        }
        tracing::debug!(
            source_len = source.len(),
            format = %self.options.output_format,
            "Converting markdown"
        );

        let mut lines: Vec<String> = source.split('\n').map(strip_placeholders).collect();
        for extension in &self.extensions {
            lines = extension.preprocess(lines);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }

        let document = parse(&lines.join("\n"))?;
        self.render_document(&document)
    }

    /// Convert an already parsed document to HTML
    pub fn convert_document(&self, document: &Document) -> Result<String> {
        self.render_document(document).map(|rendered| rendered.html)
    }

    /// Render an already parsed document, keeping footnotes and headings
    pub fn render_document(&self, document: &Document) -> Result<Rendered> {
        self.warn_unused_configs();

        let mut renderer = Renderer::with_root_tag(&self.options.root_tag);
        let mut root = renderer.render_document(document)?;
        for extension in &self.extensions {
            extension.process_tree(&mut root);
        }
        let headings = headings(&root);

        let output = serialize(&root, self.options.output_format);
        let mut html = if self.options.strip_root {
            strip_root(&output, &root.tag)?
        } else {
            output
        };
        for extension in &self.extensions {
            html = extension.postprocess(html);
        }
        let html = html.trim().to_string();

        tracing::debug!(output_len = html.len(), headings = headings.len(), "Converted markdown");
        Ok(Rendered {
            html,
            footnotes: renderer.into_footnotes(),
            headings,
        })
    }

    fn warn_unused_configs(&self) {
        for name in self.options.extension_configs.keys() {
            if !self.extension_names().any(|registered| registered == name) {
                tracing::warn!(extension = %name, "Ignoring config for unregistered extension");
            }
        }
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::FnExtension;
    use cmark_tree_core::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_paragraph() {
        let md = Markdown::new();
        assert_eq!(md.convert("Hello World").unwrap(), "<p>Hello World</p>");
    }

    #[test]
    fn test_blank_source() {
        let md = Markdown::new();
        assert_eq!(md.convert("").unwrap(), "");
        assert_eq!(md.convert("  \n\t\n").unwrap(), "");
    }

    #[test]
    fn test_html_output_format() {
        let options = MarkdownOptions {
            output_format: OutputFormat::Html,
            ..Default::default()
        };
        let md = Markdown::with_options(options);
        assert_eq!(md.convert("a  \nb").unwrap(), "<p>a<br>\nb</p>");
    }

    #[test]
    fn test_keep_root_tag() {
        let options = MarkdownOptions {
            root_tag: "article".to_string(),
            strip_root: false,
            ..Default::default()
        };
        let md = Markdown::with_options(options);
        assert_eq!(md.convert("x").unwrap(), "<article><p>x</p>\n</article>");
    }

    #[test]
    fn test_custom_root_tag_is_stripped() {
        let options = MarkdownOptions {
            root_tag: "section".to_string(),
            ..Default::default()
        };
        let md = Markdown::with_options(options);
        assert_eq!(md.convert("x").unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_placeholder_markers_removed() {
        let md = Markdown::new();
        assert_eq!(md.convert("a\u{2}b\u{3}c").unwrap(), "<p>abc</p>");
    }

    #[test]
    fn test_extension_hooks_run_in_order() {
        let md = Markdown::new()
            .with_extension(
                FnExtension::new("shout")
                    .with_preprocess(|lines| lines.into_iter().map(|l| l.to_uppercase()).collect()),
            )
            .with_extension(
                FnExtension::new("wrap")
                    .with_tree_processor(|root| {
                        if let Some(p) = root.children.first_mut() {
                            p.set_attr("class", "lead");
                        }
                    })
                    .with_postprocess(|html| format!("{}\n<!-- done -->", html)),
            );

        assert_eq!(
            md.convert("hi").unwrap(),
            "<p class=\"lead\">HI</p>\n<!-- done -->"
        );
    }

    #[test]
    fn test_preprocessor_may_drop_all_lines() {
        let md = Markdown::new().with_extension(
            FnExtension::new("drop").with_preprocess(|_| Vec::new()),
        );
        assert_eq!(md.convert("text").unwrap(), "");
    }

    #[test]
    fn test_extension_receives_config() {
        let mut options = MarkdownOptions::default();
        let mut config = ExtensionConfig::new();
        config.insert("suffix".to_string(), "!".to_string());
        options.extension_configs.insert("ext".to_string(), config);
        options
            .extension_configs
            .insert("missing".to_string(), ExtensionConfig::new());

        let mut md = Markdown::with_options(options);
        md.add_extension(FnExtension::new("ext"));
        assert_eq!(md.extension_names().collect::<Vec<_>>(), vec!["ext"]);

        // the unregistered "missing" config is ignored
        assert_eq!(md.convert("x").unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_use_plugin() {
        let mut md = Markdown::new();
        md.use_plugin(|md| {
            md.options_mut().output_format = OutputFormat::Html;
        });
        assert_eq!(md.options().output_format, OutputFormat::Html);
        assert_eq!(md.convert("---").unwrap(), "<hr>");
    }

    #[test]
    fn test_render_collects_footnotes_and_headings() {
        let md = Markdown::new();
        let rendered = md
            .render("# Q&amp;A\n\nSee [x][r].\n\n[r]: /target\n")
            .unwrap();
        assert_eq!(rendered.html, "<h1>Q&amp;A</h1>\n<p>See <a href=\"/target\">x</a>.</p>");
        assert_eq!(
            rendered.headings,
            vec![Heading {
                level: 1,
                title: "Q&A".to_string()
            }]
        );
        assert_eq!(rendered.footnotes.len(), 1);
    }

    #[test]
    fn test_root_attribute_breaks_stripping() {
        let md = Markdown::new().with_extension(
            FnExtension::new("tag-root").with_tree_processor(|root| root.set_attr("id", "doc")),
        );
        let err = md.convert("x").unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }));
    }

    #[test]
    fn test_empty_root_tag_is_an_error() {
        let options = MarkdownOptions {
            root_tag: String::new(),
            strip_root: false,
            ..Default::default()
        };
        let md = Markdown::with_options(options);
        let err = md.convert("# Title\n\nbody").unwrap_err();
        assert!(matches!(err, Error::InvalidRootTag(_)));
    }

    #[test]
    fn test_convert_document() {
        let document = parse("*a*").unwrap();
        let md = Markdown::new();
        assert_eq!(md.convert_document(&document).unwrap(), "<p><em>a</em></p>");
    }
}
