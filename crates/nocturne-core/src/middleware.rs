//! Middleware layers and chain composition.
//!
//! Layers are declared per directory prefix and stored in a [`ScopeTree`].
//! For a matched route, [`compose`] collects the layers from the root down
//! to the route's directory and appends the route handler as the terminal
//! link:
//!
//! ```text
//! /                  root_mw      ┐
//! /layeredMdw        layer1_mw    │ compose("/layeredMdw/layer2/:id")
//! /layeredMdw/layer2 layer2_mw    ┘   → [root_mw, layer1_mw, layer2_mw] + handler
//! /layeredMdw/layer2/layer3  layer3_mw   (not on the path, skipped)
//! ```
//!
//! Each link receives the context and a [`Next`]. Calling `next.run(ctx)`
//! continues the chain; returning without calling it short-circuits; an
//! `Err` aborts the chain and is turned into a 500 by the server.
//!
//! ```rust,ignore
//! async fn auth_mw(ctx: RequestContext, next: Next) -> NocturneResult<Response> {
//!     if ctx.header("authorization").is_none() {
//!         return Ok(text("401"));
//!     }
//!     next.run(ctx).await
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use crate::context::RequestContext;
use crate::error::NocturneResult;
use crate::handler::Handler;
use crate::routing::{Route, ScopeTree};

#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, ctx: RequestContext, next: Next) -> NocturneResult<Response>;
}

#[async_trait]
impl<F, Fut> Middleware for F
where
    F: Fn(RequestContext, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NocturneResult<Response>> + Send + 'static,
{
    async fn handle(&self, ctx: RequestContext, next: Next) -> NocturneResult<Response> {
        (self)(ctx, next).await
    }
}

/// Directory-scoped middleware layers.
pub type MiddlewareTree = ScopeTree<Arc<dyn Middleware>>;

/// A composed execution chain: ordered links plus the terminal handler.
pub struct Chain {
    links: Vec<Arc<dyn Middleware>>,
    endpoint: Arc<dyn Handler>,
}

impl Chain {
    pub fn new(links: Vec<Arc<dyn Middleware>>, endpoint: Arc<dyn Handler>) -> Self {
        Chain { links, endpoint }
    }

    /// Number of middleware links (the terminal handler excluded).
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Run the chain from its first link.
    pub async fn run(self: Arc<Self>, ctx: RequestContext) -> NocturneResult<Response> {
        Next {
            chain: self,
            index: 0,
        }
        .run(ctx)
        .await
    }
}

/// Continuation handed to each link. Consumed by [`Next::run`], so a link
/// continues the chain at most once.
pub struct Next {
    chain: Arc<Chain>,
    index: usize,
}

impl Next {
    /// Invoke the next link, or the route handler once the links are exhausted.
    pub async fn run(self, ctx: RequestContext) -> NocturneResult<Response> {
        match self.chain.links.get(self.index).cloned() {
            Some(link) => {
                let next = Next {
                    chain: self.chain.clone(),
                    index: self.index + 1,
                };
                link.handle(ctx, next).await
            }
            None => self.chain.endpoint.call(ctx).await,
        }
    }

    /// Links still ahead of this continuation, the handler excluded.
    pub fn remaining(&self) -> usize {
        self.chain.links.len().saturating_sub(self.index)
    }
}

/// Build the chain for `route`: every layer from the root down to the
/// route's directory, root first, then `endpoint`.
pub fn compose(route: &Route, endpoint: Arc<dyn Handler>, tree: &MiddlewareTree) -> Arc<Chain> {
    let links = tree
        .collect(&route.pattern().tokens())
        .into_iter()
        .cloned()
        .collect();
    Arc::new(Chain::new(links, endpoint))
}
