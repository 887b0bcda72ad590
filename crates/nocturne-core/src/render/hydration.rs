//! Island hydration payload and client script tags.
//!
//! The payload is two parallel arrays, island ids and props, in first-use
//! order. A props value equal to an earlier usage's is written as `null` and
//! listed in `r` as `[usage, earlier]`:
//!
//! ```text
//! {"r":[[1,0]],"v":[["counter","counter","title"],[{"start":3},null,{"text":"hi"}]]}
//! ```

use std::fmt::Write;

use serde_json::{Value, json};

use crate::island::PropValue;

/// Element ids of the inline JSON tags read by the client runtime.
pub const STATE_SCRIPT_ID: &str = "__NOC_STATE";
pub const PLUGIN_STATE_SCRIPT_ID: &str = "__NOC_PLUGIN_STATE";

/// One recorded island render.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandUsage {
    pub id: String,
    pub props: PropValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HydrationPayload {
    ids: Vec<String>,
    props: Vec<Option<PropValue>>,
    refs: Vec<(usize, usize)>,
}

impl HydrationPayload {
    pub fn from_usages(usages: &[IslandUsage]) -> Self {
        let mut ids = Vec::with_capacity(usages.len());
        let mut props: Vec<Option<PropValue>> = Vec::with_capacity(usages.len());
        let mut refs = Vec::new();

        for (i, usage) in usages.iter().enumerate() {
            ids.push(usage.id.clone());
            let earlier = usages[..i]
                .iter()
                .enumerate()
                .position(|(j, u)| props[j].is_some() && u.props == usage.props);
            match earlier {
                Some(j) => {
                    refs.push((i, j));
                    props.push(None);
                }
                None => props.push(Some(usage.props.clone())),
            }
        }

        HydrationPayload { ids, props, refs }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn refs(&self) -> &[(usize, usize)] {
        &self.refs
    }

    pub fn to_value(&self) -> Value {
        let props: Vec<Value> = self
            .props
            .iter()
            .map(|p| p.as_ref().map(PropValue::to_json).unwrap_or(Value::Null))
            .collect();
        let mut payload = json!({ "v": [self.ids, props] });
        if !self.refs.is_empty() {
            let refs: Vec<[usize; 2]> = self.refs.iter().map(|&(a, b)| [a, b]).collect();
            payload["r"] = json!(refs);
        }
        payload
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// Make JSON safe to embed inside a `<script>` element.
pub fn escape_inline_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}

/// URL of a client bundle under the build-hashed prefix.
pub fn bundle_url(build_id: &str, name: &str) -> String {
    format!("/_noc/js/{}/{}", build_id, name)
}

/// Script tags reviving the islands in `usages`. Empty when no island was used.
pub fn hydration_scripts(build_id: &str, usages: &[IslandUsage]) -> String {
    if usages.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<script src="{}" type="module"></script>"#,
        bundle_url(build_id, "main.js")
    );

    let mut seen: Vec<&str> = Vec::new();
    for usage in usages {
        if seen.contains(&usage.id.as_str()) {
            continue;
        }
        seen.push(&usage.id);
        let _ = write!(
            out,
            r#"<script src="{}" type="module"></script>"#,
            bundle_url(build_id, &format!("island-{}.js", usage.id))
        );
    }

    let payload = HydrationPayload::from_usages(usages);
    let _ = write!(
        out,
        r#"<script id="{}" type="application/json">{}</script>"#,
        STATE_SCRIPT_ID,
        escape_inline_json(&payload.to_json())
    );
    out
}
