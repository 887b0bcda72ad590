use std::fmt::Write;
use std::sync::Arc;

use axum::response::Response;
use serde_json::{Map, Value};

use crate::error::{NocturneError, NocturneResult};
use crate::manifest::Manifest;
use crate::plugin::{PluginScript, RenderSummary};
use crate::response;
use crate::routing::Route;

use super::context::RenderContext;
use super::head::{Head, escape_html};
use super::hydration::{PLUGIN_STATE_SCRIPT_ID, bundle_url, escape_inline_json, hydration_scripts};
use super::{LayoutProps, PageProps};

/// Render `route`'s page inside its layouts and assemble the document.
///
/// Order of work:
/// 1. page component, then layouts from innermost to outermost
/// 2. plugin `render` hooks, which see the finished body
/// 3. head merge: plugins, then layouts outer to inner, then the page
/// 4. hydration and plugin scripts, document shell
/// 5. plugin `transform_html` hooks on the whole document
pub fn render_page(
    manifest: &Arc<Manifest>,
    route: &Arc<Route>,
    props: &PageProps,
) -> NocturneResult<Response> {
    let page = route.page().ok_or_else(|| {
        NocturneError::handler(format!("route `{}` has no page component", route.pattern()))
    })?;

    let mut cx = RenderContext::new(manifest.clone());
    let mut body = page.render(props, &mut cx)?;
    let page_head = cx.take_head();

    let layouts = manifest.layouts_for(route);
    let mut layout_heads = Vec::with_capacity(layouts.len());
    for layout in layouts.iter().rev() {
        let layout_props = LayoutProps {
            children: body,
            page: props.clone(),
        };
        body = layout.render(&layout_props, &mut cx)?;
        layout_heads.push(cx.take_head());
    }
    let state = cx.into_state();

    let summary = RenderSummary {
        route: &props.route,
        url: &props.url,
        islands: state.island_ids(),
        body: &body,
    };

    let mut head = Head::new();
    let mut plugin_scripts: Vec<(&str, PluginScript)> = Vec::new();
    for plugin in manifest.plugins().iter() {
        let out = plugin.render(&summary)?;
        for style in out.styles {
            head.push_style(style);
        }
        plugin_scripts.extend(out.scripts.into_iter().map(|s| (plugin.name(), s)));
    }
    // layout_heads is innermost first
    for layout_head in layout_heads.into_iter().rev() {
        head.merge(layout_head);
    }
    head.merge(page_head);

    let mut scripts = hydration_scripts(state.build_id(), state.usages());
    scripts.push_str(&plugin_script_tags(state.build_id(), &plugin_scripts)?);

    let mut html = document(manifest.lang(), &head, &body, &scripts);
    for plugin in manifest.plugins().iter() {
        html = plugin.transform_html(html)?;
    }

    tracing::debug!(
        route = %props.route,
        islands = state.usages().len(),
        "rendered page"
    );
    Ok(response::html(html))
}

fn document(lang: &str, head: &Head, body: &str, scripts: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="{}"><head><meta charset="utf-8" /><meta name="viewport" content="width=device-width, initial-scale=1.0" />{}</head><body>{}{}</body></html>"#,
        escape_html(lang),
        head.to_html(),
        body,
        scripts
    )
}

/// `<script>` tags for plugin client entries plus one JSON tag holding the
/// states of the entries that carry one, keyed by bundle stem.
fn plugin_script_tags(build_id: &str, scripts: &[(&str, PluginScript)]) -> NocturneResult<String> {
    let mut out = String::new();
    let mut states = Map::new();
    for (plugin, script) in scripts {
        let stem = format!("plugin-{}-{}", plugin, script.entry);
        let _ = write!(
            out,
            r#"<script src="{}" type="module"></script>"#,
            bundle_url(build_id, &format!("{}.js", stem))
        );
        if let Some(state) = &script.state {
            states.insert(stem, state.clone());
        }
    }
    if !states.is_empty() {
        let json = serde_json::to_string(&Value::Object(states))?;
        let _ = write!(
            out,
            r#"<script id="{}" type="application/json">{}</script>"#,
            PLUGIN_STATE_SCRIPT_ID,
            escape_inline_json(&json)
        );
    }
    Ok(out)
}
