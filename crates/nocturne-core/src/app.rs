use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::manifest::Manifest;
use crate::server::{ConnInfo, ServerContext};

/// The main Nocturne application: a manifest plus its configuration.
pub struct App {
    pub config: Config,
    manifest: Arc<Manifest>,
}

impl App {
    /// Create an application, reading [`Config`] from the environment.
    pub fn new(manifest: Arc<Manifest>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Ok(Self::with_config(manifest, config))
    }

    /// Create an application with a given config.
    pub fn with_config(manifest: Arc<Manifest>, config: Config) -> Self {
        App { config, manifest }
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn server_context(&self) -> ServerContext {
        ServerContext::from_manifest(self.manifest.clone()).max_body_size(self.config.max_body_size)
    }

    /// Build the axum router serving the manifest.
    pub fn router(&self) -> Router {
        let mut router = self.server_context().handler();

        // Only add tracing/request-id middleware in development mode.
        if self.config.is_dev() {
            use tower_http::LatencyUnit;
            use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse};

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::DEBUG))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Bind `SERVER_HOST:SERVER_PORT` and serve until Ctrl-C.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let listener = TcpListener::bind(&addr).await?;

        println!("\n🌙 Nocturne server is running!");
        println!("   → Server:   http://{}", listener.local_addr()?);
        println!("   → Build id: {}", self.manifest.build_id());
        println!("   → Routes:   {}", self.manifest.router().len());
        for route in self.manifest.router().routes() {
            println!("     • {}", route.pattern());
        }
        println!();

        tracing::info!(
            addr = %addr,
            build_id = %self.manifest.build_id(),
            "Nocturne server running"
        );

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        axum::serve(listener, router.into_make_service_with_connect_info::<ConnInfo>())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down Nocturne server...");
}
