//! Nocturne prelude: import everything an application needs with one line.
//!
//! ```rust,ignore
//! use nocturne_core::prelude::*;
//! ```

// ── Core types ─────────────────────────────────────────────────
pub use crate::App;
pub use crate::Config;
pub use crate::{Manifest, ManifestBuilder};
pub use crate::{NocturneError, NocturneResult};
pub use crate::{RequestContext, ServerContext};

// ── Routing & middleware ───────────────────────────────────────
pub use crate::middleware::{Middleware, Next};
pub use crate::routing::{RouteDecl, TrailingSlash};

// ── Rendering & islands ────────────────────────────────────────
pub use crate::island::{Island, PropSchema, PropValue};
pub use crate::render::{Head, HeadStyle, LayoutProps, PageProps, RenderContext, escape_html};
pub use crate::static_files::StaticFile;

// ── Plugins ────────────────────────────────────────────────────
pub use crate::plugin::{Plugin, PluginMiddleware, PluginRender, PluginScript, RenderSummary};

// ── Responses ──────────────────────────────────────────────────
pub use crate::response::{html, json, redirect, text};
pub use crate::Response;
pub use crate::http::{HeaderMap, Method, StatusCode};

// ── Logging ────────────────────────────────────────────────────
pub use crate::logging::{init_logging, init_logging_json, init_logging_pretty, init_logging_with_level};

// ── Serde (almost every page needs these) ──────────────────────
pub use serde::{Deserialize, Serialize};
pub use serde_json::json;
