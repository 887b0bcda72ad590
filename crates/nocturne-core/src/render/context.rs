use std::sync::Arc;

use serde::Serialize;

use crate::error::{NocturneError, NocturneResult};
use crate::island::PropValue;
use crate::manifest::Manifest;

use super::head::Head;
use super::hydration::IslandUsage;

/// Per-render state: island usages in first-use order and the head fragment
/// of the component currently rendering. Created for one request and dropped
/// with its response.
#[derive(Debug, Default)]
pub struct RenderState {
    build_id: String,
    usages: Vec<IslandUsage>,
    head: Head,
}

impl RenderState {
    pub fn new(build_id: impl Into<String>) -> Self {
        RenderState {
            build_id: build_id.into(),
            ..Default::default()
        }
    }

    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    pub fn usages(&self) -> &[IslandUsage] {
        &self.usages
    }

    /// Distinct island ids, first use first.
    pub fn island_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for usage in &self.usages {
            if !ids.contains(&usage.id.as_str()) {
                ids.push(&usage.id);
            }
        }
        ids
    }
}

/// Handle passed to page, layout and island components while they render.
pub struct RenderContext {
    manifest: Arc<Manifest>,
    state: RenderState,
    island_depth: usize,
}

impl RenderContext {
    pub fn new(manifest: Arc<Manifest>) -> Self {
        let state = RenderState::new(manifest.build_id());
        RenderContext {
            manifest,
            state,
            island_depth: 0,
        }
    }

    /// Head fragment of the component currently rendering.
    pub fn head(&mut self) -> &mut Head {
        &mut self.state.head
    }

    pub fn build_id(&self) -> &str {
        self.state.build_id()
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    /// Hashed URL of a known static file; unknown paths come back unchanged.
    pub fn asset(&self, path: &str) -> String {
        self.manifest.statics().asset_url(path)
    }

    /// Render island `id` with `props` and record the usage for hydration.
    ///
    /// Islands rendered from inside another island are emitted as plain
    /// markup and not recorded.
    pub fn island<P: Serialize + ?Sized>(&mut self, id: &str, props: &P) -> NocturneResult<String> {
        let island = self
            .manifest
            .islands()
            .get(id)
            .cloned()
            .ok_or_else(|| NocturneError::handler(format!("unknown island `{}`", id)))?;
        let value = PropValue::from_serialize(props)?;
        island.validate(&value)?;

        if self.island_depth > 0 {
            return island.component().render(&value, self);
        }

        let index = self.state.usages.len();
        self.state.usages.push(IslandUsage {
            id: id.to_string(),
            props: value.clone(),
        });

        self.island_depth += 1;
        let rendered = island.component().render(&value, self);
        self.island_depth -= 1;

        Ok(format!(
            "<!--noc-island:{}:{}-->{}<!--/noc-island-->",
            id, index, rendered?
        ))
    }

    /// Detach the current head fragment, leaving an empty one.
    pub(crate) fn take_head(&mut self) -> Head {
        std::mem::take(&mut self.state.head)
    }

    pub(crate) fn into_state(self) -> RenderState {
        self.state
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("state", &self.state)
            .field("island_depth", &self.island_depth)
            .finish()
    }
}
