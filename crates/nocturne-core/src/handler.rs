//! Route handlers.
//!
//! A handler is anything implementing [`Handler`]; plain `async fn`s with the
//! signature `async fn(RequestContext) -> NocturneResult<Response>` qualify
//! through the blanket implementation.
//!
//! ```rust,ignore
//! async fn get_only(_ctx: RequestContext) -> NocturneResult<Response> {
//!     Ok(text("only GET is allowed here"))
//! }
//!
//! RouteDecl::api("/api/get_only").get(get_only);
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use axum::response::Response;

use crate::context::RequestContext;
use crate::error::NocturneResult;

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, ctx: RequestContext) -> NocturneResult<Response>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext) -> NocturneResult<Response> {
        (self)(ctx).await
    }
}

/// Default handler of page routes that declare no handler of their own:
/// renders the page component with `null` data.
pub(crate) struct RenderPage;

#[async_trait]
impl Handler for RenderPage {
    async fn call(&self, ctx: RequestContext) -> NocturneResult<Response> {
        ctx.render(serde_json::Value::Null)
    }
}

/// The handlers of one route: a single handler for every method, or one
/// handler per declared method.
#[derive(Clone)]
pub enum Handlers {
    Any(Arc<dyn Handler>),
    Methods(Vec<(Method, Arc<dyn Handler>)>),
}

impl Handlers {
    /// Resolve the handler for `method`. `HEAD` falls back to `GET`.
    pub fn resolve(&self, method: &Method) -> Option<Arc<dyn Handler>> {
        match self {
            Handlers::Any(handler) => Some(handler.clone()),
            Handlers::Methods(methods) => {
                let find = |m: &Method| {
                    methods
                        .iter()
                        .find(|(declared, _)| declared == m)
                        .map(|(_, h)| h.clone())
                };
                find(method).or_else(|| {
                    if *method == Method::HEAD {
                        find(&Method::GET)
                    } else {
                        None
                    }
                })
            }
        }
    }

    /// Methods accepted by these handlers, for the `allow` header.
    pub fn allowed(&self) -> Vec<String> {
        match self {
            Handlers::Any(_) => vec!["*".to_string()],
            Handlers::Methods(methods) => {
                let mut allow: Vec<String> = methods.iter().map(|(m, _)| m.to_string()).collect();
                let has = |name: &str| allow.iter().any(|m| m == name);
                if has("GET") && !has("HEAD") {
                    allow.push("HEAD".to_string());
                }
                allow
            }
        }
    }

    /// Add or replace the handler for `method`.
    pub(crate) fn insert(&mut self, method: Method, handler: Arc<dyn Handler>) {
        match self {
            Handlers::Any(_) => *self = Handlers::Methods(vec![(method, handler)]),
            Handlers::Methods(methods) => {
                match methods.iter_mut().find(|(declared, _)| *declared == method) {
                    Some(slot) => slot.1 = handler,
                    None => methods.push((method, handler)),
                }
            }
        }
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handlers").field(&self.allowed()).finish()
    }
}
