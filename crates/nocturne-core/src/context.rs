//! Per-request context handed to middleware and handlers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use bytes::Bytes;
use serde::Serialize;

use crate::error::NocturneResult;
use crate::island::PropValue;
use crate::manifest::Manifest;
use crate::render::{self, PageProps};
use crate::routing::{Params, Route};
use crate::server::ConnInfo;

/// Everything a middleware link or route handler knows about the request.
///
/// The context moves down the chain by value. `state` is the scratch space
/// middleware use to pass data to later links and to the handler.
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    /// Absolute request URL (`scheme://host/path?query`).
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Parameters bound by the route pattern.
    pub params: Params,
    /// Per-request state shared along the middleware chain.
    pub state: HashMap<String, serde_json::Value>,
    conn: Option<ConnInfo>,
    target: Option<PageTarget>,
}

#[derive(Clone)]
struct PageTarget {
    manifest: Arc<Manifest>,
    route: Arc<Route>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, url: String, headers: HeaderMap, body: Bytes) -> Self {
        RequestContext {
            method,
            uri,
            url,
            headers,
            body,
            params: Params::new(),
            state: HashMap::new(),
            conn: None,
            target: None,
        }
    }

    pub(crate) fn with_conn(mut self, conn: Option<ConnInfo>) -> Self {
        self.conn = conn;
        self
    }

    pub(crate) fn with_route(
        mut self,
        manifest: Arc<Manifest>,
        route: Arc<Route>,
        params: Params,
    ) -> Self {
        self.params = params;
        self.target = Some(PageTarget { manifest, route });
        self
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the client prefers HTML (`accept` mentions `text/html`).
    pub fn accepts_html(&self) -> bool {
        self.header("accept").is_some_and(|a| a.contains("text/html"))
    }

    /// The matched route's pattern, e.g. `/props/:id`.
    pub fn route_pattern(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.route.pattern().as_str())
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.conn.as_ref().map(|c| c.remote_addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.conn.as_ref().and_then(|c| c.local_addr)
    }

    /// Render the matched page route with `data` as the page's data.
    ///
    /// Fails when the matched route is an API route without a page
    /// component, or when `data` is not representable as JSON (non-finite
    /// floats included).
    pub fn render(&self, data: impl Serialize) -> NocturneResult<Response> {
        let target = self.target.as_ref().ok_or_else(|| {
            crate::error::NocturneError::handler("render() called outside of a matched route")
        })?;
        let props = PageProps {
            params: self.params.clone(),
            url: self.url.clone(),
            route: target.route.pattern().to_string(),
            data: PropValue::from_serialize(&data)?.to_json(),
        };
        render::render_page(&target.manifest, &target.route, &props)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("state", &self.state)
            .finish()
    }
}
