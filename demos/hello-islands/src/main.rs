//! # Nocturne Hello Islands
//!
//! A small site rendered on the server, with one interactive counter island.
//!
//! ## Run
//!
//! ```bash
//! cargo run -p nocturne-hello-islands
//! ```
//!
//! ## Routes
//!
//! - `GET /`: Home page with two counters (same props, hydrated once)
//! - `GET /greet/:name`: Dynamic page
//! - `GET /api/time`: JSON endpoint
//! - `GET /robots.txt`, `/logo.svg`: Static files

use std::time::{SystemTime, UNIX_EPOCH};

use nocturne_core::prelude::*;

struct ThemePlugin;

impl Plugin for ThemePlugin {
    fn name(&self) -> &str {
        "theme"
    }

    fn render(&self, _summary: &RenderSummary<'_>) -> NocturneResult<PluginRender> {
        Ok(PluginRender::default().style(HeadStyle::with_id(
            "theme",
            "body { font-family: system-ui; background: #edf2f4; color: #2b2d42; }",
        )))
    }
}

fn counter(props: &PropValue, _cx: &mut RenderContext) -> NocturneResult<String> {
    let start = props.get("start").and_then(PropValue::as_i64).unwrap_or(0);
    Ok(format!(r#"<div class="counter"><button>{}</button></div>"#, start))
}

fn home(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.head()
        .title("Nocturne")
        .meta("description", "Server-rendered pages with islands");
    let first = cx.island("counter", &json!({ "start": 3 }))?;
    let second = cx.island("counter", &json!({ "start": 3 }))?;
    Ok(format!(
        r#"<h1>Hello, islands</h1>{}{}<p><a href="/greet/world">Say hi</a></p>"#,
        first, second
    ))
}

fn greet(props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    let name = props.params.get("name").map(String::as_str).unwrap_or("stranger");
    cx.head().title(format!("Hello {}", name));
    Ok(format!("<h1>Hello {}</h1>", escape_html(name)))
}

fn layout(props: &LayoutProps, cx: &mut RenderContext) -> NocturneResult<String> {
    Ok(format!(
        r#"<header><img src="{}" alt="logo" /></header><main>{}</main>"#,
        cx.asset("/logo.svg"),
        props.children
    ))
}

async fn time(_ctx: RequestContext) -> NocturneResult<Response> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    json(&json!({ "unix": secs }))
}

async fn powered_by(ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    let mut res = next.run(ctx).await?;
    res.headers_mut()
        .insert("x-powered-by", nocturne_core::http::HeaderValue::from_static("nocturne"));
    Ok(res)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    let manifest = Manifest::builder()
        .with_config(&config)
        .route(RouteDecl::page("/", home))
        .route(RouteDecl::page("/greet/:name", greet))
        .route(RouteDecl::api("/api/time").get(time))
        .middleware("/", powered_by)
        .layout("/", layout)
        .island(Island::new("counter", counter).schema(PropSchema::map([("start", PropSchema::Integer)])))
        .static_file(StaticFile::memory("/robots.txt", include_str!("../static/robots.txt")))
        .static_file(StaticFile::disk(
            "/logo.svg",
            concat!(env!("CARGO_MANIFEST_DIR"), "/static/logo.svg"),
        ))
        .bundle("main.js", include_str!("../client/main.js"))
        .bundle("island-counter.js", include_str!("../client/island-counter.js"))
        .plugin(ThemePlugin)
        .build()?;

    tracing::info!(routes = manifest.router().len(), "manifest ready");

    App::with_config(manifest, config).run().await
}
