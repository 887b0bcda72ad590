use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Standard error type for the Nocturne framework.
///
/// Every variant maps to exactly one HTTP response. `NotFound`,
/// `MethodNotAllowed` and `RedirectRequired` are produced by the route
/// matcher before any handler runs; `Handler` and `Serialization` only
/// surface through the render pipeline's error boundary.
#[derive(Debug, Error)]
pub enum NocturneError {
    /// No route pattern matches the request path.
    #[error("404 not found: {0}")]
    NotFound(String),

    /// A route pattern matched but none of the matching routes accept the method.
    #[error("method not allowed")]
    MethodNotAllowed {
        /// Methods accepted by the routes whose pattern matched.
        allow: Vec<String>,
    },

    /// Trailing-slash canonicalization; the payload is the absolute target URL.
    #[error("redirect required: {0}")]
    RedirectRequired(String),

    /// A middleware, handler or component failed.
    #[error("{0}")]
    Handler(String),

    /// Props or page data could not be represented as a serializable value.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The declarations handed to the manifest builder are inconsistent.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NocturneError {
    /// Shorthand for a handler failure with the given message.
    pub fn handler(message: impl Into<String>) -> Self {
        NocturneError::Handler(message.into())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            NocturneError::NotFound(_) => StatusCode::NOT_FOUND,
            NocturneError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            NocturneError::RedirectRequired(_) => StatusCode::TEMPORARY_REDIRECT,
            NocturneError::Handler(_)
            | NocturneError::Serialization(_)
            | NocturneError::Manifest(_)
            | NocturneError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            NocturneError::NotFound(_) => "NOT_FOUND",
            NocturneError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            NocturneError::RedirectRequired(_) => "REDIRECT_REQUIRED",
            NocturneError::Handler(_) => "HANDLER_FAILURE",
            NocturneError::Serialization(_) => "SERIALIZATION_FAILURE",
            NocturneError::Manifest(_) => "INVALID_MANIFEST",
            NocturneError::Io(_) => "IO_ERROR",
        }
    }
}

impl From<serde_json::Error> for NocturneError {
    fn from(e: serde_json::Error) -> Self {
        NocturneError::Serialization(e.to_string())
    }
}

impl IntoResponse for NocturneError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            NocturneError::NotFound(path) => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("404 not found: {}", path),
            )
                .into_response(),
            NocturneError::MethodNotAllowed { allow } => {
                let mut res = status.into_response();
                if let Ok(value) = HeaderValue::from_str(&allow.join(", ")) {
                    res.headers_mut().insert(header::ALLOW, value);
                }
                res
            }
            NocturneError::RedirectRequired(location) => {
                let mut res = status.into_response();
                match HeaderValue::from_str(&location) {
                    Ok(value) => {
                        res.headers_mut().insert(header::LOCATION, value);
                        res
                    }
                    Err(_) => {
                        NocturneError::Handler(format!("invalid redirect target: {}", location))
                            .into_response()
                    }
                }
            }
            other => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("500 internal error: {}", other),
            )
                .into_response(),
        }
    }
}

pub type NocturneResult<T> = Result<T, NocturneError>;
