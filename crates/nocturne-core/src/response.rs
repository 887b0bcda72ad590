//! Response helpers for handlers and middleware.
//!
//! ```rust,ignore
//! async fn intercept(ctx: RequestContext) -> NocturneResult<Response> {
//!     if ctx.accepts_html() {
//!         return ctx.render(json!({ "intercepted": true }));
//!     }
//!     Ok(text("This is plain text"))
//! }
//! ```

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::NocturneResult;

/// `200` with `text/html; charset=utf-8`.
pub fn html(body: impl Into<String>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body.into(),
    )
        .into_response()
}

/// `200` with `text/plain; charset=utf-8`.
pub fn text(body: impl Into<String>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.into(),
    )
        .into_response()
}

/// `200` with `application/json`.
pub fn json<T: Serialize>(value: &T) -> NocturneResult<Response> {
    let body = serde_json::to_vec(value)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// `status` with an empty body.
pub fn status(status: StatusCode) -> Response {
    status.into_response()
}

/// `307` to `location`. The method and body are preserved by the client.
pub fn redirect(location: &str) -> Response {
    let mut res = StatusCode::TEMPORARY_REDIRECT.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        res.headers_mut().insert(header::LOCATION, value);
    }
    res
}
