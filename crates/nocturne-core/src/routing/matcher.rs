//! Route lookup.
//!
//! # Design Decisions
//! - Routes are compiled once and sorted by (specificity, registration order)
//! - Immutable after construction, shared across requests without locks
//! - A pattern hit with the wrong method is remembered so the result is
//!   `MethodNotAllowed` rather than `NotFound`

use std::sync::Arc;

use axum::http::Method;

use crate::handler::Handler;

use super::pattern::{Params, split_path};
use super::route::{Route, TrailingSlash};

/// Outcome of a route lookup.
pub enum RouteMatch {
    Found {
        route: Arc<Route>,
        handler: Arc<dyn Handler>,
        params: Params,
    },
    /// A pattern matched but no matching route accepts the method.
    MethodNotAllowed { allow: Vec<String> },
    /// `path/` should be answered with a redirect to `path`.
    Redirect { path: String },
    NotFound,
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteMatch::Found { route, params, .. } => f
                .debug_struct("Found")
                .field("route", &route.pattern().as_str())
                .field("params", params)
                .finish(),
            RouteMatch::MethodNotAllowed { allow } => {
                f.debug_struct("MethodNotAllowed").field("allow", allow).finish()
            }
            RouteMatch::Redirect { path } => {
                f.debug_struct("Redirect").field("path", path).finish()
            }
            RouteMatch::NotFound => f.write_str("NotFound"),
        }
    }
}

/// Compiled route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Arc<Route>>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        let mut routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
        // stable: registration order survives inside each rank
        routes.sort_by_key(|r| (r.pattern().specificity(), r.order()));
        Router { routes }
    }

    /// Routes in match order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match `method` + `path`, applying trailing-slash canonicalization first.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch {
        if path.len() > 1 && path.ends_with('/') {
            let stripped = path.trim_end_matches('/');
            let canonical = if stripped.is_empty() { "/" } else { stripped };
            let segments = split_path(canonical);
            let hit = self.routes.iter().find(|r| r.pattern().matches(&segments).is_some());
            if let Some(route) = hit {
                if route.trailing_slash() == TrailingSlash::Redirect {
                    return RouteMatch::Redirect {
                        path: canonical.to_string(),
                    };
                }
            } else {
                return RouteMatch::NotFound;
            }
        }

        self.lookup(method, &split_path(path))
    }

    fn lookup(&self, method: &Method, segments: &[&str]) -> RouteMatch {
        let mut allow: Vec<String> = Vec::new();
        let mut pattern_hit = false;

        for route in &self.routes {
            let Some(params) = route.pattern().matches(segments) else {
                continue;
            };
            if let Some(handler) = route.handlers().resolve(method) {
                return RouteMatch::Found {
                    route: route.clone(),
                    handler,
                    params,
                };
            }
            pattern_hit = true;
            for m in route.handlers().allowed() {
                if !allow.contains(&m) {
                    allow.push(m);
                }
            }
        }

        if pattern_hit {
            RouteMatch::MethodNotAllowed { allow }
        } else {
            RouteMatch::NotFound
        }
    }
}
