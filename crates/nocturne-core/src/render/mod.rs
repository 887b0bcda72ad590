//! Page rendering: components, head merging, island hydration.
//!
//! Components are plain functions from props to markup. The HTML they
//! return is trusted; use [`escape_html`] on untrusted text.
//!
//! ```rust,ignore
//! fn home(props: &PageProps, cx: &mut RenderContext) -> NocturneResult<String> {
//!     cx.head().title("Home").meta("description", "Hello world!");
//!     let counter = cx.island("counter", &json!({ "start": 3 }))?;
//!     Ok(format!("<h1>Home</h1>{}<img src=\"{}\">", counter, cx.asset("/logo.svg")))
//! }
//! ```

mod context;
mod head;
mod hydration;
mod pipeline;

pub use context::{RenderContext, RenderState};
pub use head::{Head, HeadStyle, escape_html};
pub use hydration::{
    HydrationPayload, IslandUsage, PLUGIN_STATE_SCRIPT_ID, STATE_SCRIPT_ID, bundle_url,
    escape_inline_json, hydration_scripts,
};
pub use pipeline::render_page;

use serde::Serialize;

use crate::error::NocturneResult;
use crate::routing::Params;

/// Something that renders `P` to markup.
pub trait Component<P>: Send + Sync + 'static {
    fn render(&self, props: &P, cx: &mut RenderContext) -> NocturneResult<String>;
}

impl<P, F> Component<P> for F
where
    F: Fn(&P, &mut RenderContext) -> NocturneResult<String> + Send + Sync + 'static,
{
    fn render(&self, props: &P, cx: &mut RenderContext) -> NocturneResult<String> {
        (self)(props, cx)
    }
}

/// Props of a page component.
#[derive(Debug, Clone, Serialize)]
pub struct PageProps {
    pub params: Params,
    /// Absolute request URL.
    pub url: String,
    /// Pattern of the matched route, e.g. `/props/:id`.
    pub route: String,
    /// Data handed to `ctx.render(data)`; omitted when null.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Props of a layout component: the rendered child plus the page's props.
#[derive(Debug, Clone)]
pub struct LayoutProps {
    pub children: String,
    pub page: PageProps,
}
