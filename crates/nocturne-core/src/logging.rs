//! Logging and tracing initialization for Nocturne.
//!
//! Nocturne logs through `tracing`: every 500 is reported with
//! `tracing::error!`, redirects and renders at `debug`, and in development
//! mode `tower-http` adds one span per request. Install a subscriber once,
//! before building the manifest:
//!
//! ```rust,no_run
//! use nocturne_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let manifest = Manifest::builder().build()?;
//!     App::new(manifest)?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! `RUST_LOG` takes precedence over the level passed in code:
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! RUST_LOG=nocturne_core=debug,tower_http=info cargo run
//! ```
//!
//! Calling an initializer after a subscriber is already installed is a no-op.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Multi-line output with source locations (development).
    Pretty,
    /// One JSON object per event (production, log aggregation).
    Json,
}

impl LogFormat {
    /// `pretty`, `json`, anything else is compact.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global subscriber with `format`, filtering at `default_level`
/// unless `RUST_LOG` is set.
pub fn try_init_logging(format: LogFormat, default_level: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
    }
}

/// Compact logging at `info`.
pub fn init_logging() {
    let _ = try_init_logging(LogFormat::Compact, "info");
}

/// Compact logging at `level` (`trace`, `debug`, `info`, `warn`, `error`).
pub fn init_logging_with_level(level: &str) {
    let _ = try_init_logging(LogFormat::Compact, level);
}

/// Pretty logging at `info`, for development.
pub fn init_logging_pretty() {
    let _ = try_init_logging(LogFormat::Pretty, "info");
}

/// JSON logging at `info`, for production.
pub fn init_logging_json() {
    let _ = try_init_logging(LogFormat::Json, "info");
}
