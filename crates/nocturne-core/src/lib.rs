pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod island;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod plugin;
pub mod prelude;
pub mod render;
pub mod response;
pub mod routing;
pub mod server;
pub mod static_files;
pub mod testing;

pub use app::App;
pub use config::Config;
pub use context::RequestContext;
pub use error::{NocturneError, NocturneResult};
pub use manifest::{Manifest, ManifestBuilder};
pub use server::{ConnInfo, ServerContext};
pub use testing::{TestApp, TestClient, TestResponse};

// Re-export the HTTP types handlers work with, so applications do not need
// a direct axum dependency.
pub use axum::http;
pub use axum::response::Response;
