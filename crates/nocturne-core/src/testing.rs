//! End-to-end test harness: a real server on an ephemeral port plus an
//! HTTP client that does not follow redirects.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_home() {
//!     let app = TestApp::new(manifest()).await;
//!     let res = app.client.get(&app.url("/")).await;
//!     assert_eq!(res.status, 200);
//!     assert!(res.body.contains("<p>Hello!</p>"));
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::manifest::Manifest;

/// A running server for integration tests.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub config: Config,
}

impl TestApp {
    /// Serve `manifest` on `127.0.0.1:0` in test mode.
    pub async fn new(manifest: Arc<Manifest>) -> Self {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
            ..Config::default()
        };
        Self::with_config(manifest, config).await
    }

    pub async fn with_config(manifest: Arc<Manifest>, config: Config) -> Self {
        let app = crate::App::with_config(manifest, config.clone());
        let listener = TcpListener::bind(config.server_addr())
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            app.serve(listener, std::future::pending())
                .await
                .expect("test server failed");
        });

        TestApp {
            addr,
            client: TestClient::new(addr),
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    pub fn new(addr: SocketAddr) -> Self {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");
        TestClient {
            inner,
            base_addr: addr,
        }
    }

    pub fn base_addr(&self) -> SocketAddr {
        self.base_addr
    }

    pub async fn get(&self, url: &str) -> TestResponse {
        self.request(Method::GET, url, &[], None).await
    }

    pub async fn get_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request(Method::GET, url, headers, None).await
    }

    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        self.request(Method::POST, url, &[], Some(body)).await
    }

    pub async fn delete(&self, url: &str) -> TestResponse {
        self.request(Method::DELETE, url, &[], None).await
    }

    /// Send any request; `headers` are `(name, value)` pairs.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> TestResponse {
        let mut req = self.inner.request(method.clone(), url);
        for (name, value) in headers {
            req = req.header(
                HeaderName::from_bytes(name.as_bytes()).expect("invalid header name"),
                HeaderValue::from_str(value).expect("invalid header value"),
            );
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }
        let res = req
            .send()
            .await
            .unwrap_or_else(|e| panic!("{} request failed: {}", method, e));
        TestResponse::from_response(res).await
    }
}

/// Status, headers and body of a finished response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }
}
