use super::value::PropValue;

/// Shape check applied to an island's props the first time they are used.
///
/// Maps are open: keys not listed in [`PropSchema::Map`] are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum PropSchema {
    Any,
    Null,
    Bool,
    Number,
    /// A number with an integral value.
    Integer,
    String,
    List(Box<PropSchema>),
    /// Required keys with their schemas.
    Map(Vec<(String, PropSchema)>),
    /// `null` or the inner schema.
    Optional(Box<PropSchema>),
}

impl PropSchema {
    pub fn list(item: PropSchema) -> Self {
        PropSchema::List(Box::new(item))
    }

    pub fn optional(inner: PropSchema) -> Self {
        PropSchema::Optional(Box::new(inner))
    }

    pub fn map<K: Into<String>>(fields: impl IntoIterator<Item = (K, PropSchema)>) -> Self {
        PropSchema::Map(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// Validate `value`, returning a message naming the failing location.
    pub fn validate(&self, value: &PropValue) -> Result<(), String> {
        self.check(value, "props")
    }

    fn check(&self, value: &PropValue, at: &str) -> Result<(), String> {
        let ok = match (self, value) {
            (PropSchema::Any, _) => true,
            (PropSchema::Optional(_), PropValue::Null) => true,
            (PropSchema::Optional(inner), v) => return inner.check(v, at),
            (PropSchema::Null, PropValue::Null) => true,
            (PropSchema::Bool, PropValue::Bool(_)) => true,
            (PropSchema::Number, PropValue::Number(_)) => true,
            (PropSchema::Integer, PropValue::Number(n)) => n.is_i64() || n.is_u64(),
            (PropSchema::String, PropValue::String(_)) => true,
            (PropSchema::List(item), PropValue::List(items)) => {
                for (i, v) in items.iter().enumerate() {
                    item.check(v, &format!("{}[{}]", at, i))?;
                }
                true
            }
            (PropSchema::Map(fields), PropValue::Map(map)) => {
                for (key, schema) in fields {
                    let path = format!("{}.{}", at, key);
                    match map.get(key) {
                        Some(v) => schema.check(v, &path)?,
                        None => return Err(format!("{}: missing required key", path)),
                    }
                }
                true
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("{}: expected {}, got {}", at, self.describe(), value.kind()))
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            PropSchema::Any => "any",
            PropSchema::Null => "null",
            PropSchema::Bool => "bool",
            PropSchema::Number => "number",
            PropSchema::Integer => "integer",
            PropSchema::String => "string",
            PropSchema::List(_) => "list",
            PropSchema::Map(_) => "map",
            PropSchema::Optional(_) => "optional",
        }
    }
}
