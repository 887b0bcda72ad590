use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;

use crate::context::RequestContext;
use crate::error::{NocturneError, NocturneResult};
use crate::handler::{Handler, Handlers, RenderPage};
use crate::render::{Component, PageProps, RenderContext};

use super::pattern::RoutePattern;

/// What happens to `/path/` when `/path` is a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingSlash {
    /// Answer `307` with the slash-stripped URL.
    #[default]
    Redirect,
    /// Serve the slash form as if it were the canonical path.
    Ignore,
}

/// A compiled route, owned by the manifest.
pub struct Route {
    pattern: RoutePattern,
    handlers: Handlers,
    page: Option<Arc<dyn Component<PageProps>>>,
    trailing_slash: TrailingSlash,
    order: usize,
}

impl Route {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    pub fn page(&self) -> Option<&Arc<dyn Component<PageProps>>> {
        self.page.as_ref()
    }

    pub fn trailing_slash(&self) -> TrailingSlash {
        self.trailing_slash
    }

    /// Registration index within the manifest.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_page(&self) -> bool {
        self.page.is_some()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("handlers", &self.handlers)
            .field("page", &self.page.is_some())
            .field("order", &self.order)
            .finish()
    }
}

/// A route declaration, as supplied by the application or a plugin.
///
/// ```rust,ignore
/// // page with the default GET handler
/// RouteDecl::page("/", home);
///
/// // page whose handler decides how to answer
/// RouteDecl::page("/intercept", intercept_page)
///     .get(intercept_get)
///     .post(intercept_post);
///
/// // API route
/// RouteDecl::api("/api/get_only").get(get_only);
/// ```
pub struct RouteDecl {
    path: String,
    page: Option<Arc<dyn Component<PageProps>>>,
    handlers: Option<Handlers>,
    trailing_slash: TrailingSlash,
}

impl RouteDecl {
    /// A page route rendered by `component`.
    pub fn page<F>(path: impl Into<String>, component: F) -> Self
    where
        F: Fn(&PageProps, &mut RenderContext) -> NocturneResult<String> + Send + Sync + 'static,
    {
        RouteDecl {
            path: path.into(),
            page: Some(Arc::new(component)),
            handlers: None,
            trailing_slash: TrailingSlash::default(),
        }
    }

    /// A page route rendered by an existing component.
    pub fn page_component(
        path: impl Into<String>,
        component: Arc<dyn Component<PageProps>>,
    ) -> Self {
        RouteDecl {
            path: path.into(),
            page: Some(component),
            handlers: None,
            trailing_slash: TrailingSlash::default(),
        }
    }

    /// An API route; add handlers with [`get`](Self::get), [`post`](Self::post), ...
    pub fn api(path: impl Into<String>) -> Self {
        RouteDecl {
            path: path.into(),
            page: None,
            handlers: None,
            trailing_slash: TrailingSlash::default(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Handle `method` with `handler`.
    pub fn method<F, Fut>(self, method: Method, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.method_handler(method, Arc::new(handler))
    }

    pub fn method_handler(mut self, method: Method, handler: Arc<dyn Handler>) -> Self {
        match self.handlers.as_mut() {
            Some(handlers) => handlers.insert(method, handler),
            None => self.handlers = Some(Handlers::Methods(vec![(method, handler)])),
        }
        self
    }

    pub fn get<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.method(Method::GET, handler)
    }

    pub fn post<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.method(Method::POST, handler)
    }

    pub fn put<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.method(Method::PUT, handler)
    }

    pub fn patch<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.method(Method::PATCH, handler)
    }

    pub fn delete<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.method(Method::DELETE, handler)
    }

    /// Handle every method with `handler`, replacing per-method handlers.
    pub fn any<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
    {
        self.handlers = Some(Handlers::Any(Arc::new(handler)));
        self
    }

    pub fn trailing_slash(mut self, policy: TrailingSlash) -> Self {
        self.trailing_slash = policy;
        self
    }

    pub(crate) fn compile(self, order: usize) -> NocturneResult<Route> {
        let pattern = RoutePattern::parse(&self.path)?;
        let handlers = match (self.handlers, &self.page) {
            (Some(handlers), _) => handlers,
            (None, Some(_)) => Handlers::Methods(vec![(Method::GET, Arc::new(RenderPage))]),
            (None, None) => {
                return Err(NocturneError::Manifest(format!(
                    "API route `{}` declares no handler",
                    pattern
                )));
            }
        };
        Ok(Route {
            pattern,
            handlers,
            page: self.page,
            trailing_slash: self.trailing_slash,
            order,
        })
    }
}
