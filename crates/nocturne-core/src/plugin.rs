//! The `Plugin` trait: packaged routes, middleware, islands and render hooks.
//!
//! Plugins are registered on the manifest builder and folded into the
//! manifest before the server starts. Every hook runs in registration order.
//!
//! # Example
//!
//! ```rust,ignore
//! use nocturne_core::prelude::*;
//!
//! pub struct CssPlugin;
//!
//! impl Plugin for CssPlugin {
//!     fn name(&self) -> &str { "css" }
//!
//!     fn render(&self, _summary: &RenderSummary<'_>) -> NocturneResult<PluginRender> {
//!         Ok(PluginRender::default().style(HeadStyle::with_id("abc", "body { color: red; }")))
//!     }
//! }
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::error::{NocturneError, NocturneResult};
use crate::island::Island;
use crate::middleware::Middleware;
use crate::render::HeadStyle;
use crate::routing::RouteDecl;

/// What a page looked like once rendered, handed to [`Plugin::render`].
#[derive(Debug, Clone)]
pub struct RenderSummary<'a> {
    /// Pattern of the rendered route.
    pub route: &'a str,
    pub url: &'a str,
    /// Distinct islands used by the page, first use first.
    pub islands: Vec<&'a str>,
    /// Rendered body markup, layouts included.
    pub body: &'a str,
}

impl RenderSummary<'_> {
    /// Whether the page will ship island hydration scripts.
    pub fn requires_hydration(&self) -> bool {
        !self.islands.is_empty()
    }
}

/// A client entry point contributed by a plugin, served as
/// `/_noc/js/{build_id}/plugin-{plugin}-{entry}.js`.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginScript {
    pub entry: String,
    /// JSON state handed to the entry on the client.
    pub state: Option<Value>,
}

impl PluginScript {
    pub fn new(entry: impl Into<String>) -> Self {
        PluginScript {
            entry: entry.into(),
            state: None,
        }
    }

    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }
}

/// Output of [`Plugin::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginRender {
    pub styles: Vec<HeadStyle>,
    pub scripts: Vec<PluginScript>,
}

impl PluginRender {
    pub fn style(mut self, style: HeadStyle) -> Self {
        self.styles.push(style);
        self
    }

    pub fn script(mut self, script: PluginScript) -> Self {
        self.scripts.push(script);
        self
    }
}

/// Middleware a plugin mounts at `path` (leading slash optional).
pub struct PluginMiddleware {
    pub path: String,
    pub handlers: Vec<Arc<dyn Middleware>>,
}

impl PluginMiddleware {
    pub fn new(path: impl Into<String>) -> Self {
        PluginMiddleware {
            path: path.into(),
            handlers: Vec::new(),
        }
    }

    pub fn handler<M: Middleware>(mut self, middleware: M) -> Self {
        self.handlers.push(Arc::new(middleware));
        self
    }
}

/// A composable extension of a Nocturne application.
pub trait Plugin: Send + Sync + 'static {
    /// Unique name; also part of the plugin's script bundle names.
    fn name(&self) -> &str;

    /// Routes added to the application. Paths may omit the leading slash.
    fn routes(&self) -> Vec<RouteDecl> {
        Vec::new()
    }

    /// Middleware layers. Within a directory, application middleware runs
    /// before plugin middleware.
    fn middlewares(&self) -> Vec<PluginMiddleware> {
        Vec::new()
    }

    fn islands(&self) -> Vec<Island> {
        Vec::new()
    }

    /// Called after the page body is rendered. Styles are merged into the
    /// head ahead of layout and page fragments.
    fn render(&self, _summary: &RenderSummary<'_>) -> NocturneResult<PluginRender> {
        Ok(PluginRender::default())
    }

    /// Rewrite the assembled document.
    fn transform_html(&self, html: String) -> NocturneResult<String> {
        Ok(html)
    }
}

/// Registered plugins in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> NocturneResult<()> {
        let name = plugin.name();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(NocturneError::Manifest(format!("invalid plugin name `{}`", name)));
        }
        if self.plugins.iter().any(|p| p.name() == name) {
            return Err(NocturneError::Manifest(format!(
                "plugin `{}` registered twice",
                name
            )));
        }
        tracing::debug!(plugin = %name, "registered plugin");
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}
