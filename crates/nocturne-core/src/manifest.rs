//! The manifest: everything the server knows about the application.
//!
//! A manifest is assembled once by [`ManifestBuilder`] and never mutated
//! afterwards; the server shares it as `Arc<Manifest>`.
//!
//! ```rust,ignore
//! let manifest = Manifest::builder()
//!     .build_id("8f2c1a")
//!     .route(RouteDecl::page("/", home))
//!     .route(RouteDecl::page("/props/:id", props_page))
//!     .route(RouteDecl::api("/api/get_only").get(get_only))
//!     .middleware("/", root_mw)
//!     .layout("/", app_layout)
//!     .island(Island::new("counter", counter))
//!     .static_file(StaticFile::memory("/foo.txt", "bar\n"))
//!     .bundle("main.js", MAIN_JS)
//!     .plugin(CssPlugin)
//!     .build()?;
//! ```
//!
//! Plugin contributions are folded in after the application's own, in
//! plugin registration order.

use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{NocturneError, NocturneResult};
use crate::island::{Island, IslandRegistry};
use crate::middleware::{Middleware, MiddlewareTree};
use crate::plugin::{Plugin, PluginRegistry};
use crate::render::{Component, LayoutProps, RenderContext};
use crate::routing::{Route, RouteDecl, RoutePattern, Router, ScopeTree};
use crate::static_files::{StaticFile, StaticResponder};

pub type LayoutTree = ScopeTree<Arc<dyn Component<LayoutProps>>>;

pub struct Manifest {
    build_id: String,
    lang: String,
    router: Router,
    middleware: MiddlewareTree,
    layouts: LayoutTree,
    islands: IslandRegistry,
    statics: StaticResponder,
    plugins: PluginRegistry,
}

impl Manifest {
    pub fn builder() -> ManifestBuilder {
        ManifestBuilder::default()
    }

    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn middleware(&self) -> &MiddlewareTree {
        &self.middleware
    }

    pub fn islands(&self) -> &IslandRegistry {
        &self.islands
    }

    pub fn statics(&self) -> &StaticResponder {
        &self.statics
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Layouts wrapping `route`, outermost first.
    pub fn layouts_for(&self, route: &Route) -> Vec<Arc<dyn Component<LayoutProps>>> {
        self.layouts
            .collect(&route.pattern().tokens())
            .into_iter()
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field("build_id", &self.build_id)
            .field("lang", &self.lang)
            .field("routes", &self.router.len())
            .field("islands", &self.islands.len())
            .field("statics", &self.statics.len())
            .field("plugins", &self.plugins)
            .finish()
    }
}

/// Collects declarations; [`build`](Self::build) validates and freezes them.
#[derive(Default)]
pub struct ManifestBuilder {
    build_id: Option<String>,
    lang: Option<String>,
    routes: Vec<RouteDecl>,
    middlewares: Vec<(String, Arc<dyn Middleware>)>,
    layouts: Vec<(String, Arc<dyn Component<LayoutProps>>)>,
    islands: Vec<Island>,
    static_files: Vec<StaticFile>,
    bundles: Vec<(String, Bytes)>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl ManifestBuilder {
    pub fn build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Take the build id and language from `config` unless already set.
    pub fn with_config(mut self, config: &Config) -> Self {
        if self.build_id.is_none() {
            self.build_id = config.build_id.clone();
        }
        if self.lang.is_none() {
            self.lang = Some(config.lang.clone());
        }
        self
    }

    pub fn route(mut self, route: RouteDecl) -> Self {
        self.routes.push(route);
        self
    }

    /// Mount `middleware` on the directory `path`.
    pub fn middleware<M: Middleware>(mut self, path: impl Into<String>, middleware: M) -> Self {
        self.middlewares.push((path.into(), Arc::new(middleware)));
        self
    }

    /// Wrap every page at or below `path` in `layout`.
    pub fn layout<F>(self, path: impl Into<String>, layout: F) -> Self
    where
        F: Fn(&LayoutProps, &mut RenderContext) -> NocturneResult<String> + Send + Sync + 'static,
    {
        self.layout_component(path, Arc::new(layout))
    }

    pub fn layout_component(
        mut self,
        path: impl Into<String>,
        layout: Arc<dyn Component<LayoutProps>>,
    ) -> Self {
        self.layouts.push((path.into(), layout));
        self
    }

    pub fn island(mut self, island: Island) -> Self {
        self.islands.push(island);
        self
    }

    pub fn static_file(mut self, file: StaticFile) -> Self {
        self.static_files.push(file);
        self
    }

    /// A client bundle produced by the build step, e.g. `main.js` or
    /// `island-counter.js`.
    pub fn bundle(mut self, name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.bundles.push((name.into(), bytes.into()));
        self
    }

    pub fn plugin<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn build(self) -> NocturneResult<Arc<Manifest>> {
        let build_id = self
            .build_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let lang = self.lang.unwrap_or_else(|| "en".to_string());

        let mut plugins = PluginRegistry::new();
        for plugin in self.plugins {
            plugins.register(plugin)?;
        }

        let mut decls = self.routes;
        let mut middlewares = self.middlewares;
        let mut islands_decl = self.islands;
        for plugin in plugins.iter() {
            decls.extend(plugin.routes());
            for mw in plugin.middlewares() {
                for handler in mw.handlers {
                    middlewares.push((mw.path.clone(), handler));
                }
            }
            islands_decl.extend(plugin.islands());
        }

        let mut routes: Vec<Route> = Vec::with_capacity(decls.len());
        for (order, decl) in decls.into_iter().enumerate() {
            let route = decl.compile(order)?;
            if routes.iter().any(|r| r.pattern().as_str() == route.pattern().as_str()) {
                return Err(NocturneError::Manifest(format!(
                    "route `{}` declared twice",
                    route.pattern()
                )));
            }
            routes.push(route);
        }

        let mut middleware = MiddlewareTree::new();
        for (path, handler) in middlewares {
            middleware.insert(&RoutePattern::parse(&path)?.tokens(), handler);
        }

        let mut layouts = LayoutTree::new();
        for (path, layout) in self.layouts {
            layouts.insert(&RoutePattern::parse(&path)?.tokens(), layout);
        }

        let mut islands = IslandRegistry::new();
        for island in islands_decl {
            islands.register(island)?;
        }

        let mut statics = StaticResponder::new(build_id.clone());
        for file in self.static_files {
            statics.add_file(file)?;
        }
        for (name, bytes) in self.bundles {
            statics.add_bundle(&name, bytes)?;
        }

        let manifest = Manifest {
            build_id,
            lang,
            router: Router::new(routes),
            middleware,
            layouts,
            islands,
            statics,
            plugins,
        };
        tracing::debug!(?manifest, "manifest built");
        Ok(Arc::new(manifest))
    }
}
