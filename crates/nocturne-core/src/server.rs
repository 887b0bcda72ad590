//! Request dispatch.
//!
//! ```text
//! request
//!   → static/asset responder   (GET/HEAD on known asset paths)
//!   → trailing-slash redirect  (307, query preserved)
//!   → route matcher            (404 / 405)
//!   → middleware chain + handler, inside the error boundary
//!       Err(e)  → e.into_response()   (500 "500 internal error: …")
//!       panic   → 500 with the panic message
//! ```
//!
//! [`ServerContext::handler`] returns an axum `Router` whose fallback runs
//! this pipeline, so it can be served directly or driven with
//! `tower::ServiceExt::oneshot` in tests.

use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::{ConnectInfo, Connected};
use axum::extract::{Request, State};
use axum::http::{header, request::Parts};
use axum::response::{IntoResponse, Response};
use axum::serve::IncomingStream;
use futures::FutureExt;
use tokio::net::TcpListener;

use crate::context::RequestContext;
use crate::error::NocturneError;
use crate::manifest::Manifest;
use crate::middleware::compose;
use crate::routing::RouteMatch;

const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Addresses of the connection a request arrived on.
///
/// Captured by `axum::serve` through
/// `into_make_service_with_connect_info::<ConnInfo>()` and exposed on
/// [`RequestContext`]. Never used for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnInfo {
    pub local_addr: Option<SocketAddr>,
    pub remote_addr: SocketAddr,
}

impl Connected<IncomingStream<'_, TcpListener>> for ConnInfo {
    fn connect_info(stream: IncomingStream<'_, TcpListener>) -> Self {
        ConnInfo {
            local_addr: stream.io().local_addr().ok(),
            remote_addr: *stream.remote_addr(),
        }
    }
}

/// The server side of a manifest.
#[derive(Debug, Clone)]
pub struct ServerContext {
    manifest: Arc<Manifest>,
    max_body_size: usize,
}

impl ServerContext {
    pub fn from_manifest(manifest: Arc<Manifest>) -> Self {
        ServerContext {
            manifest,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    /// An axum router answering every request through [`dispatch`](Self::dispatch).
    pub fn handler(&self) -> axum::Router {
        axum::Router::new()
            .fallback(fallback)
            .with_state(Arc::new(self.clone()))
    }

    /// Answer one request. Never fails: every error becomes a response.
    pub async fn dispatch(&self, req: Request) -> Response {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();

        if let Some(result) = self
            .manifest
            .statics()
            .respond(&parts.method, &path, &parts.headers)
            .await
        {
            return result.unwrap_or_else(failure);
        }

        let origin = origin(&parts);
        match self.manifest.router().match_route(&parts.method, &path) {
            RouteMatch::Redirect { path: canonical } => {
                let location = match parts.uri.query() {
                    Some(query) => format!("{}{}?{}", origin, canonical, query),
                    None => format!("{}{}", origin, canonical),
                };
                tracing::debug!(from = %path, to = %location, "trailing slash redirect");
                NocturneError::RedirectRequired(location).into_response()
            }
            RouteMatch::NotFound => NocturneError::NotFound(path).into_response(),
            RouteMatch::MethodNotAllowed { allow } => {
                NocturneError::MethodNotAllowed { allow }.into_response()
            }
            RouteMatch::Found {
                route,
                handler,
                params,
            } => {
                let body = match axum::body::to_bytes(body, self.max_body_size).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        return failure(NocturneError::handler(format!(
                            "failed to read request body: {}",
                            e
                        )));
                    }
                };
                let conn = parts.extensions.get::<ConnectInfo<ConnInfo>>().map(|c| c.0);
                let url = match parts.uri.path_and_query() {
                    Some(pq) => format!("{}{}", origin, pq),
                    None => format!("{}{}", origin, path),
                };

                let chain = compose(&route, handler, self.manifest.middleware());
                let ctx = RequestContext::new(parts.method, parts.uri, url, parts.headers, body)
                    .with_conn(conn)
                    .with_route(self.manifest.clone(), route, params);

                match AssertUnwindSafe(chain.run(ctx)).catch_unwind().await {
                    Ok(Ok(res)) => res,
                    Ok(Err(e)) => failure(e),
                    Err(panic) => failure(NocturneError::Handler(panic_message(panic.as_ref()))),
                }
            }
        }
    }
}

async fn fallback(State(ctx): State<Arc<ServerContext>>, req: Request<Body>) -> Response {
    ctx.dispatch(req).await
}

/// Turn an error into its response, logging server-side failures.
fn failure(err: NocturneError) -> Response {
    if err.status_code().is_server_error() {
        tracing::error!(error = %err, code = err.error_code(), "request failed");
    }
    err.into_response()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// `scheme://authority` of the request, from the absolute URI when the
/// client sent one, otherwise from the `host` header.
fn origin(parts: &Parts) -> String {
    let scheme = parts.uri.scheme_str().unwrap_or("http");
    let host = parts
        .uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            parts
                .headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}://{}", scheme, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, host: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_origin_from_absolute_uri() {
        assert_eq!(
            origin(&parts("https://nocturne.dev/pages/fresh/", None)),
            "https://nocturne.dev"
        );
    }

    #[test]
    fn test_origin_from_host_header() {
        assert_eq!(origin(&parts("/x", Some("127.0.0.1:4000"))), "http://127.0.0.1:4000");
        assert_eq!(origin(&parts("/x", None)), "http://localhost");
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("it panicked");
        assert_eq!(panic_message(boxed.as_ref()), "it panicked");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("formatted 42"));
        assert_eq!(panic_message(boxed.as_ref()), "formatted 42");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "handler panicked");
    }
}
