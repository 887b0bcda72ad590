//! Interactive islands: components that are server-rendered and then revived
//! in the browser from serialized props.
//!
//! ```rust,ignore
//! let counter = Island::new("counter", |props: &PropValue, _cx: &mut RenderContext| {
//!     let start = props.get("start").and_then(PropValue::as_i64).unwrap_or(0);
//!     Ok(format!("<button>{}</button>", start))
//! })
//! .schema(PropSchema::map([("start", PropSchema::Integer)]));
//! ```

mod schema;
mod value;

pub use schema::PropSchema;
pub use value::{PropError, PropValue};

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NocturneError, NocturneResult};
use crate::render::{Component, RenderContext};

pub struct Island {
    id: String,
    component: Arc<dyn Component<PropValue>>,
    schema: Option<PropSchema>,
}

impl Island {
    pub fn new<F>(id: impl Into<String>, component: F) -> Self
    where
        F: Fn(&PropValue, &mut RenderContext) -> NocturneResult<String> + Send + Sync + 'static,
    {
        Island {
            id: id.into(),
            component: Arc::new(component),
            schema: None,
        }
    }

    pub fn schema(mut self, schema: PropSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn component(&self) -> &Arc<dyn Component<PropValue>> {
        &self.component
    }

    /// Name of the client bundle reviving this island.
    pub fn bundle_name(&self) -> String {
        format!("island-{}.js", self.id)
    }

    /// Check `props` against the schema, if one is declared.
    pub fn validate(&self, props: &PropValue) -> NocturneResult<()> {
        match &self.schema {
            Some(schema) => schema.validate(props).map_err(|msg| {
                NocturneError::Serialization(format!("island `{}`: {}", self.id, msg))
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Island {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Island")
            .field("id", &self.id)
            .field("schema", &self.schema)
            .finish()
    }
}

fn validate_id(id: &str) -> NocturneResult<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(NocturneError::Manifest(format!("invalid island id `{}`", id)))
    }
}

/// Islands by id, in registration order.
#[derive(Debug, Default)]
pub struct IslandRegistry {
    islands: Vec<Arc<Island>>,
    by_id: HashMap<String, usize>,
}

impl IslandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, island: Island) -> NocturneResult<()> {
        validate_id(island.id())?;
        if self.by_id.contains_key(island.id()) {
            return Err(NocturneError::Manifest(format!(
                "island `{}` registered twice",
                island.id()
            )));
        }
        self.by_id.insert(island.id().to_string(), self.islands.len());
        self.islands.push(Arc::new(island));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Island>> {
        self.by_id.get(id).map(|&i| &self.islands[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Island>> {
        self.islands.iter()
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &PropValue, _: &mut RenderContext) -> NocturneResult<String> {
        Ok(String::new())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = IslandRegistry::new();
        reg.register(Island::new("counter", noop)).unwrap();
        reg.register(Island::new("test", noop)).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("test").unwrap().bundle_name(), "island-test.js");
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_and_invalid_ids_rejected() {
        let mut reg = IslandRegistry::new();
        reg.register(Island::new("counter", noop)).unwrap();
        assert!(reg.register(Island::new("counter", noop)).is_err());
        assert!(reg.register(Island::new("", noop)).is_err());
        assert!(reg.register(Island::new("../x", noop)).is_err());
    }

    #[test]
    fn test_schema_failure_is_serialization_error() {
        let island = Island::new("counter", noop)
            .schema(PropSchema::map([("start", PropSchema::Integer)]));
        let err = island.validate(&PropValue::default()).unwrap_err();
        assert!(matches!(err, NocturneError::Serialization(_)));
        assert!(err.to_string().contains("props.start"));
    }
}
