//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (manifest build):
//!     RouteDecl[]
//!     → parse patterns (literal / :param / :param(re) / :rest*)
//!     → sort by (specificity, registration order)
//!     → freeze as immutable Router
//!
//! Incoming Request (method, path)
//!     → matcher.rs (trailing-slash check, segment-wise match)
//!     → Found(route, handler, params) | MethodNotAllowed | Redirect | NotFound
//! ```

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod tree;

pub use matcher::{RouteMatch, Router};
pub use pattern::{Params, RoutePattern, Segment, Specificity, split_path};
pub use route::{Route, RouteDecl, TrailingSlash};
pub use tree::ScopeTree;
