#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use nocturne_core::prelude::*;
use nocturne_core::ConnInfo;
use tower::ServiceExt;

pub const BUILD_ID: &str = "test-build";
pub const ORIGIN: &str = "https://nocturne.dev";

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Drive `router` with one request, as if it arrived from 127.0.0.1:80.
pub async fn send(router: &axum::Router, mut req: Request<Body>) -> Reply {
    let addr: SocketAddr = "127.0.0.1:80".parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(ConnInfo {
        local_addr: Some(addr),
        remote_addr: addr,
    }));
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub fn request(method: Method, path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(format!("{}{}", ORIGIN, path));
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(router: &axum::Router, path: &str) -> Reply {
    send(router, request(Method::GET, path, &[])).await
}

pub fn router(manifest: Arc<Manifest>) -> axum::Router {
    ServerContext::from_manifest(manifest).handler()
}

// ── Islands ────────────────────────────────────────────────────

fn test_island(props: &PropValue, _cx: &mut RenderContext) -> NocturneResult<String> {
    let message = props.get("message").and_then(PropValue::as_str).unwrap_or_default();
    Ok(format!("<p>{}</p>", escape_html(message)))
}

fn counter_island(props: &PropValue, cx: &mut RenderContext) -> NocturneResult<String> {
    let start = props.get("start").and_then(PropValue::as_i64).unwrap_or(0);
    // nested island: rendered as plain markup, not hydrated separately
    let label = cx.island("test", &json!({ "message": "count" }))?;
    Ok(format!("<button>{}</button>{}", start, label))
}

// ── Pages ──────────────────────────────────────────────────────

fn index(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.head().meta("description", "Hello world!");
    let island = cx.island("test", &json!({ "message": "Hello!" }))?;
    Ok(format!(
        r#"<div>{}<p>Viewing JIT render.</p><img src="{}" /></div>"#,
        island,
        cx.asset("/image.png")
    ))
}

fn props_page(props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    let json = serde_json::to_string(props)?;
    Ok(format!("<div>{}</div>", escape_html(&json)))
}

fn name_page(props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    let name = props.params.get("name").map(String::as_str).unwrap_or_default();
    Ok(format!("<div>Hello {}</div>", escape_html(name)))
}

fn intercept_page(_props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    Ok("<div>This is HTML</div>".to_string())
}

fn intercept_args_page(props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    Ok(format!("<div>{}</div>", props.data.as_str().unwrap_or_default()))
}

fn static_page(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    Ok(format!(
        r#"<p>This is a static page.</p><img src="{}" />"#,
        cx.asset("/image.png")
    ))
}

fn book_page(props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    Ok(format!("<div>Book {}</div>", props.params["id"]))
}

fn fresh_page(_props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    Ok("<div>fresh</div>".to_string())
}

fn catch_all_page(props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    Ok(format!("<div>{}</div>", props.params["path"]))
}

fn counters_page(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    let a = cx.island("counter", &json!({ "start": 3 }))?;
    let b = cx.island("counter", &json!({ "start": 3 }))?;
    let c = cx.island("test", &json!({ "message": "<b>&</b>" }))?;
    Ok(format!("{}{}{}", a, b, c))
}

fn schema_page(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.island("counter", &json!({ "start": "three" }))
}

fn nan_page(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.island("test", &vec![f64::NAN])
}

fn docs_page(props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.head().title("Docs page");
    Ok(format!("<article>{}</article>", props.params["page"]))
}

fn docs_layout(props: &LayoutProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.head().title("Docs").style_with_id("docs", "article { margin: 0; }");
    Ok(format!("<section class=\"docs\">{}</section>", props.children))
}

fn root_layout(props: &LayoutProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.head().title("Nocturne").style_with_id("docs", "body { margin: 0; }");
    Ok(format!("<main>{}</main>", props.children))
}

// ── Handlers ───────────────────────────────────────────────────

async fn intercept_get(ctx: RequestContext) -> NocturneResult<Response> {
    if ctx.accepts_html() {
        return ctx.render(json!(null));
    }
    Ok(text("This is plain text"))
}

async fn intercept_post(_ctx: RequestContext) -> NocturneResult<Response> {
    Ok(text("POST response"))
}

async fn intercept_args(ctx: RequestContext) -> NocturneResult<Response> {
    ctx.render("intercepted")
}

async fn nan_data(ctx: RequestContext) -> NocturneResult<Response> {
    ctx.render(vec![1.5, f64::NAN])
}

async fn get_only(_ctx: RequestContext) -> NocturneResult<Response> {
    Ok(text("only GET"))
}

async fn failure(_ctx: RequestContext) -> NocturneResult<Response> {
    Err(NocturneError::handler("it errored!"))
}

async fn panics(_ctx: RequestContext) -> NocturneResult<Response> {
    panic!("it panicked")
}

async fn params_echo(ctx: RequestContext) -> NocturneResult<Response> {
    Ok(text(ctx.param("path").unwrap_or_default().to_string()))
}

async fn conn_info(ctx: RequestContext) -> NocturneResult<Response> {
    let ip = ctx.remote_addr().map(|a| a.ip().to_string()).unwrap_or_default();
    Ok(text(ip))
}

async fn state_dump(ctx: RequestContext) -> NocturneResult<Response> {
    json(&ctx.state)
}

async fn echo_body(ctx: RequestContext) -> NocturneResult<Response> {
    Ok(text(String::from_utf8_lossy(&ctx.body).into_owned()))
}

// ── Middleware ─────────────────────────────────────────────────

async fn root_mw(mut ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    ctx.state.insert("root".into(), json!("root_mw"));
    let mut res = next.run(ctx).await?;
    res.headers_mut()
        .insert("server", HeaderValue::from_static("nocturne test server"));
    Ok(res)
}

async fn layer1_mw(mut ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    ctx.state.insert("layer1".into(), json!("layer1_mw"));
    next.run(ctx).await
}

async fn layer2_mw(mut ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    ctx.state.insert("layer2".into(), json!("layer2_mw"));
    next.run(ctx).await
}

async fn layer3_mw(mut ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    ctx.state.insert("layer3".into(), json!("layer3_mw"));
    let mut res = next.run(ctx).await?;
    res.headers_mut()
        .insert("layer3", HeaderValue::from_static("nocturne test server layer3"));
    Ok(res)
}

async fn guard_mw(ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    if ctx.header("x-token") != Some("letmein") {
        return Ok(text("denied"));
    }
    next.run(ctx).await
}

async fn guarded(_ctx: RequestContext) -> NocturneResult<Response> {
    Ok(text("secret"))
}

pub fn manifest() -> Arc<Manifest> {
    Manifest::builder()
        .build_id(BUILD_ID)
        .route(RouteDecl::page("/", index))
        .route(RouteDecl::page("/props/:id", props_page))
        .route(RouteDecl::page("/:name", name_page))
        .route(
            RouteDecl::page("/intercept", intercept_page)
                .get(intercept_get)
                .post(intercept_post),
        )
        .route(RouteDecl::page("/intercept_args", intercept_args_page).get(intercept_args))
        .route(RouteDecl::api("/api/get_only").get(get_only))
        .route(RouteDecl::page("/static", static_page))
        .route(RouteDecl::page("/books/:id(\\d+)", book_page))
        .route(RouteDecl::page("/pages/fresh", fresh_page))
        .route(RouteDecl::page("/lenient", fresh_page).trailing_slash(TrailingSlash::Ignore))
        .route(RouteDecl::api("/failure").get(failure))
        .route(RouteDecl::api("/panic").get(panics))
        .route(RouteDecl::page("/foo/:path*", catch_all_page))
        .route(RouteDecl::api("/params/:path*").get(params_echo))
        .route(RouteDecl::api("/connInfo").get(conn_info))
        .route(RouteDecl::api("/api/middleware_data").get(state_dump))
        .route(RouteDecl::api("/api/echo").post(echo_body))
        .route(RouteDecl::api("/layeredMdw/layer2/:id").get(state_dump))
        .route(RouteDecl::api("/layeredMdw/layer2-no-mw/without_mw").get(state_dump))
        .route(RouteDecl::api("/layeredMdw/layer2/layer3/:id").get(state_dump))
        .route(RouteDecl::api("/guarded/secret").get(guarded))
        .route(RouteDecl::page("/islands/counters", counters_page))
        .route(RouteDecl::page("/islands/schema", schema_page))
        .route(RouteDecl::page("/islands/nan", nan_page))
        .route(RouteDecl::page("/docs/:page", docs_page))
        .route(RouteDecl::page("/data/nan", intercept_args_page).get(nan_data))
        .middleware("/", root_mw)
        .middleware("/layeredMdw", layer1_mw)
        .middleware("/layeredMdw/layer2", layer2_mw)
        .middleware("/layeredMdw/layer2/layer3", layer3_mw)
        .middleware("/guarded", guard_mw)
        .layout("/docs", root_layout)
        .layout("/docs", docs_layout)
        .island(Island::new("test", test_island))
        .island(
            Island::new("counter", counter_island)
                .schema(PropSchema::map([("start", PropSchema::Integer)])),
        )
        .static_file(StaticFile::memory("/foo.txt", "bar\n"))
        .static_file(StaticFile::memory("/image.png", vec![0x89, b'P', b'N', b'G']))
        .bundle("main.js", "export function revive() {}")
        .bundle("island-test.js", "export default function Test() {}")
        .bundle("island-counter.js", "export default function Counter() {}")
        .build()
        .unwrap()
}
