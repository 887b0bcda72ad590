mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{BUILD_ID, get, router};
use nocturne_core::prelude::*;

struct CssPlugin;

impl Plugin for CssPlugin {
    fn name(&self) -> &str {
        "css"
    }

    fn render(&self, _summary: &RenderSummary<'_>) -> NocturneResult<PluginRender> {
        Ok(PluginRender::default()
            .style(HeadStyle::with_id("abc", "body { color: red; }"))
            .style(HeadStyle::with_id("def", "h1 { text-decoration: underline; }")))
    }
}

/// Adds to the `css` plugin's styles on island pages only.
struct IslandCssPlugin;

impl Plugin for IslandCssPlugin {
    fn name(&self) -> &str {
        "island-css"
    }

    fn render(&self, summary: &RenderSummary<'_>) -> NocturneResult<PluginRender> {
        if !summary.requires_hydration() {
            return Ok(PluginRender::default());
        }
        Ok(PluginRender::default()
            .style(HeadStyle::with_id("abc", "h1 { color: blue; }"))
            .style(HeadStyle::with_id("def", "h1 { font-style: italic; }")))
    }
}

struct JsInjectPlugin;

impl Plugin for JsInjectPlugin {
    fn name(&self) -> &str {
        "js-inject"
    }

    fn render(&self, summary: &RenderSummary<'_>) -> NocturneResult<PluginRender> {
        let mut out = PluginRender::default();
        if summary.requires_hydration() {
            out = out.script(PluginScript::new("main").state(json!("JS injected!")));
        }
        Ok(out)
    }
}

struct ConfigPlugin {
    title: String,
}

impl Plugin for ConfigPlugin {
    fn name(&self) -> &str {
        "config"
    }

    fn routes(&self) -> Vec<RouteDecl> {
        let title = self.title.clone();
        vec![
            RouteDecl::page("/test", move |_props: &PageProps, cx: &mut RenderContext| {
                cx.head().title(title.clone());
                Ok("<h1>look, i'm set from a plugin!</h1>".to_string())
            }),
            RouteDecl::page("no-leading-slash-here", |_props: &PageProps, _cx: &mut RenderContext| {
                Ok("<div>Hello</div>".to_string())
            }),
        ]
    }

    fn islands(&self) -> Vec<Island> {
        vec![Island::new("greeting", |props: &PropValue, _cx: &mut RenderContext| {
            let name = props.get("name").and_then(PropValue::as_str).unwrap_or("stranger");
            Ok(format!("<h1>Hi {}</h1>", escape_html(name)))
        })]
    }
}

async fn bump(mut ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    let count = ctx.state.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
    ctx.state.insert("count".into(), json!(count + 1));
    push_trace(&mut ctx, "plugin");
    next.run(ctx).await
}

fn push_trace(ctx: &mut RequestContext, who: &str) {
    let entry = ctx.state.entry("trace".into()).or_insert_with(|| json!([]));
    if let Some(list) = entry.as_array_mut() {
        list.push(json!(who));
    }
}

struct LotsOfMiddlewarePlugin;

impl Plugin for LotsOfMiddlewarePlugin {
    fn name(&self) -> &str {
        "lots-of-middleware"
    }

    fn middlewares(&self) -> Vec<PluginMiddleware> {
        vec![
            PluginMiddleware::new("lots-of-middleware")
                .handler(bump)
                .handler(bump)
                .handler(bump),
        ]
    }

    fn routes(&self) -> Vec<RouteDecl> {
        vec![
            RouteDecl::page("/lots-of-middleware", |props: &PageProps, _cx: &mut RenderContext| {
                let trace: Vec<&str> = props.data["trace"]
                    .as_array()
                    .map(|l| l.iter().filter_map(|v| v.as_str()).collect())
                    .unwrap_or_default();
                Ok(format!("<h1>{}</h1><p>{}</p>", props.data["count"], trace.join(",")))
            })
            .get(|ctx: RequestContext| async move {
                ctx.render(json!({ "count": ctx.state["count"], "trace": ctx.state["trace"] }))
            }),
        ]
    }
}

struct StampPlugin;

impl Plugin for StampPlugin {
    fn name(&self) -> &str {
        "stamp"
    }

    fn transform_html(&self, html: String) -> NocturneResult<String> {
        Ok(html.replace("</body>", "<!--stamped--></body>"))
    }
}

async fn app_first(mut ctx: RequestContext, next: Next) -> NocturneResult<Response> {
    push_trace(&mut ctx, "app");
    next.run(ctx).await
}

fn static_page(_props: &PageProps, _cx: &mut RenderContext) -> NocturneResult<String> {
    Ok("<h1>Static</h1>".to_string())
}

fn with_island(_props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
    cx.island("greeting", &json!({ "name": "plugin" }))
}

fn manifest() -> Arc<Manifest> {
    Manifest::builder()
        .build_id(BUILD_ID)
        .route(RouteDecl::page("/static", static_page))
        .route(RouteDecl::page("/with-island", with_island))
        .middleware("/lots-of-middleware", app_first)
        .plugin(CssPlugin)
        .plugin(IslandCssPlugin)
        .plugin(JsInjectPlugin)
        .plugin(ConfigPlugin {
            title: "Title Set From Plugin Config".to_string(),
        })
        .plugin(LotsOfMiddlewarePlugin)
        .plugin(StampPlugin)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_plugin_styles_on_static_page() {
    let app = router(manifest());
    let res = get(&app, "/static").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"<style id="abc">body { color: red; }</style>"#));
    assert!(res.body.contains(r#"<style id="def">h1 { text-decoration: underline; }</style>"#));
    assert!(!res.body.contains("<script"));
}

#[tokio::test]
async fn test_plugin_styles_and_scripts_on_island_page() {
    let app = router(manifest());
    let res = get(&app, "/with-island").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(
        res.body
            .contains(r#"<style id="abc">body { color: red; } h1 { color: blue; }</style>"#)
    );
    assert!(res.body.contains(
        r#"<style id="def">h1 { text-decoration: underline; } h1 { font-style: italic; }</style>"#
    ));
    assert!(res.body.contains(&format!(
        r#"<script src="/_noc/js/{}/plugin-js-inject-main.js" type="module"></script>"#,
        BUILD_ID
    )));
    assert!(res.body.contains(
        r#"<script id="__NOC_PLUGIN_STATE" type="application/json">{"plugin-js-inject-main":"JS injected!"}</script>"#
    ));
    assert!(res.body.contains("<h1>Hi plugin</h1>"));
    assert!(res.body.contains(r#"{"v":[["greeting"],[{"name":"plugin"}]]}"#));
}

#[tokio::test]
async fn test_plugin_route_with_config() {
    let app = router(manifest());
    let res = get(&app, "/test").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("<h1>look, i'm set from a plugin!</h1>"));
    assert!(res.body.contains("<title>Title Set From Plugin Config</title>"));
}

#[tokio::test]
async fn test_plugin_route_without_leading_slash() {
    let app = router(manifest());
    let res = get(&app, "/no-leading-slash-here").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("<div>Hello</div>"));
}

#[tokio::test]
async fn test_plugin_middleware_runs_after_app_middleware() {
    let app = router(manifest());
    let res = get(&app, "/lots-of-middleware").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("<h1>3</h1>"));
    assert!(res.body.contains("<p>app,plugin,plugin,plugin</p>"));
}

#[tokio::test]
async fn test_plugin_transforms_document() {
    let app = router(manifest());
    let res = get(&app, "/static").await;
    assert!(res.body.ends_with("<!--stamped--></body></html>"));
}

#[test]
fn test_duplicate_plugin_rejected() {
    let err = Manifest::builder()
        .plugin(CssPlugin)
        .plugin(CssPlugin)
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("css"));
}
