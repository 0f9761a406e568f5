//! Extension hooks around the render pipeline.

use indexmap::IndexMap;

use cmark_tree_core::Element;

/// Per-extension options, opaque to the renderer
pub type ExtensionConfig = IndexMap<String, String>;

/// Type alias for line preprocessors
pub type PreprocessFn = Box<dyn Fn(Vec<String>) -> Vec<String> + Send + Sync>;

/// Type alias for tree processors
pub type TreeProcessFn = Box<dyn Fn(&mut Element) + Send + Sync>;

/// Type alias for output postprocessors
pub type PostprocessFn = Box<dyn Fn(String) -> String + Send + Sync>;

/// A pluggable stage of the Markdown pipeline.
///
/// Every hook defaults to a no-op, so an extension only overrides the
/// stages it cares about. Hooks of all registered extensions run in
/// registration order.
pub trait Extension: Send + Sync {
    /// Name used to look up this extension's entry in the config map
    fn name(&self) -> &str;

    /// Receive options; called once at registration when a config exists
    fn configure(&mut self, _config: &ExtensionConfig) {}

    /// Rewrite source lines before parsing
    fn preprocess(&self, lines: Vec<String>) -> Vec<String> {
        lines
    }

    /// Edit the rendered tree before serialization
    fn process_tree(&self, _root: &mut Element) {}

    /// Rewrite serialized output after the wrapper tag is stripped
    fn postprocess(&self, html: String) -> String {
        html
    }
}

/// An extension assembled from closures
pub struct FnExtension {
    name: String,
    config: ExtensionConfig,
    preprocess: Option<PreprocessFn>,
    process_tree: Option<TreeProcessFn>,
    postprocess: Option<PostprocessFn>,
}

impl FnExtension {
    /// Create an extension with no hooks
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: ExtensionConfig::new(),
            preprocess: None,
            process_tree: None,
            postprocess: None,
        }
    }

    pub fn with_preprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        self.preprocess = Some(Box::new(f));
        self
    }

    pub fn with_tree_processor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Element) + Send + Sync + 'static,
    {
        self.process_tree = Some(Box::new(f));
        self
    }

    pub fn with_postprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.postprocess = Some(Box::new(f));
        self
    }

    /// Options received through [`Extension::configure`]
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }
}

impl Extension for FnExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, config: &ExtensionConfig) {
        self.config = config.clone();
    }

    fn preprocess(&self, lines: Vec<String>) -> Vec<String> {
        match &self.preprocess {
            Some(f) => f(lines),
            None => lines,
        }
    }

    fn process_tree(&self, root: &mut Element) {
        if let Some(f) = &self.process_tree {
            f(root);
        }
    }

    fn postprocess(&self, html: String) -> String {
        match &self.postprocess {
            Some(f) => f(html),
            None => html,
        }
    }
}

impl std::fmt::Debug for FnExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnExtension")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
