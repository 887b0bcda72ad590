//! `PropValue`: the closed set of values an island may receive as props.
//!
//! Props are converted through a dedicated serde [`Serializer`] rather than
//! `serde_json::to_value`, which would silently turn `NaN` into `null`.
//! Anything outside the JSON data model is a serialization failure.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{self, Serialize, Serializer};

use crate::error::NocturneError;

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    /// Integer or finite float.
    Number(serde_json::Number),
    String(String),
    List(Vec<PropValue>),
    Map(BTreeMap<String, PropValue>),
}

impl PropValue {
    /// Convert any serializable value, rejecting non-finite floats and
    /// map keys that are not strings or integers.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, NocturneError> {
        value
            .serialize(PropSerializer)
            .map_err(|e| NocturneError::Serialization(e.0))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropValue::Null => serde_json::Value::Null,
            PropValue::Bool(b) => serde_json::Value::Bool(*b),
            PropValue::Number(n) => serde_json::Value::Number(n.clone()),
            PropValue::String(s) => serde_json::Value::String(s.clone()),
            PropValue::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            PropValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        match self {
            PropValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    /// Short type name, used in schema error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropValue::Null => "null",
            PropValue::Bool(_) => "bool",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::List(_) => "list",
            PropValue::Map(_) => "map",
        }
    }
}

impl Default for PropValue {
    fn default() -> Self {
        PropValue::Map(BTreeMap::new())
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Null => serializer.serialize_unit(),
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            PropValue::Number(n) => n.serialize(serializer),
            PropValue::String(s) => serializer.serialize_str(s),
            PropValue::List(items) => items.serialize(serializer),
            PropValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Number(n.into())
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(items: Vec<PropValue>) -> Self {
        PropValue::List(items)
    }
}

impl From<BTreeMap<String, PropValue>> for PropValue {
    fn from(map: BTreeMap<String, PropValue>) -> Self {
        PropValue::Map(map)
    }
}

// ── Serializer ─────────────────────────────────────────────────

#[derive(Debug)]
pub struct PropError(String);

impl fmt::Display for PropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PropError {}

impl ser::Error for PropError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        PropError(msg.to_string())
    }
}

struct PropSerializer;

fn float(v: f64) -> Result<PropValue, PropError> {
    serde_json::Number::from_f64(v)
        .map(PropValue::Number)
        .ok_or_else(|| PropError(format!("non-finite float `{}`", v)))
}

impl Serializer for PropSerializer {
    type Ok = PropValue;
    type Error = PropError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<PropValue, PropError> {
        Ok(PropValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<PropValue, PropError> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<PropValue, PropError> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<PropValue, PropError> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<PropValue, PropError> {
        Ok(PropValue::Number(v.into()))
    }

    fn serialize_u8(self, v: u8) -> Result<PropValue, PropError> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<PropValue, PropError> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<PropValue, PropError> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<PropValue, PropError> {
        Ok(PropValue::Number(v.into()))
    }

    fn serialize_f32(self, v: f32) -> Result<PropValue, PropError> {
        float(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<PropValue, PropError> {
        float(v)
    }

    fn serialize_char(self, v: char) -> Result<PropValue, PropError> {
        Ok(PropValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<PropValue, PropError> {
        Ok(PropValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<PropValue, PropError> {
        Ok(PropValue::List(
            v.iter().map(|b| PropValue::Number((*b as u64).into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<PropValue, PropError> {
        Ok(PropValue::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<PropValue, PropError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<PropValue, PropError> {
        Ok(PropValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<PropValue, PropError> {
        Ok(PropValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<PropValue, PropError> {
        Ok(PropValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<PropValue, PropError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<PropValue, PropError> {
        let mut map = BTreeMap::new();
        map.insert(variant.to_string(), value.serialize(PropSerializer)?);
        Ok(PropValue::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, PropError> {
        Ok(SeqBuilder(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, PropError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, PropError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, PropError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, PropError> {
        Ok(MapBuilder::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapBuilder, PropError> {
        Ok(MapBuilder::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantMapBuilder, PropError> {
        Ok(VariantMapBuilder {
            variant,
            map: BTreeMap::new(),
        })
    }
}

struct SeqBuilder(Vec<PropValue>);

impl ser::SerializeSeq for SeqBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PropError> {
        self.0.push(value.serialize(PropSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<PropValue, PropError> {
        Ok(PropValue::List(self.0))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PropError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<PropValue, PropError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PropError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<PropValue, PropError> {
        ser::SerializeSeq::end(self)
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<PropValue>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PropError> {
        self.items.push(value.serialize(PropSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<PropValue, PropError> {
        let mut map = BTreeMap::new();
        map.insert(self.variant.to_string(), PropValue::List(self.items));
        Ok(PropValue::Map(map))
    }
}

#[derive(Default)]
struct MapBuilder {
    map: BTreeMap<String, PropValue>,
    pending_key: Option<String>,
}

/// Map keys must come out as strings; integers are stringified like JSON does.
fn map_key<T: Serialize + ?Sized>(key: &T) -> Result<String, PropError> {
    match key.serialize(PropSerializer)? {
        PropValue::String(s) => Ok(s),
        PropValue::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(PropError(format!("map key must be a string, got {}", other.kind()))),
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), PropError> {
        self.pending_key = Some(map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PropError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| PropError("map value without key".to_string()))?;
        self.map.insert(key, value.serialize(PropSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<PropValue, PropError> {
        Ok(PropValue::Map(self.map))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), PropError> {
        self.map.insert(key.to_string(), value.serialize(PropSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<PropValue, PropError> {
        Ok(PropValue::Map(self.map))
    }
}

struct VariantMapBuilder {
    variant: &'static str,
    map: BTreeMap<String, PropValue>,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = PropValue;
    type Error = PropError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), PropError> {
        self.map.insert(key.to_string(), value.serialize(PropSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<PropValue, PropError> {
        let mut outer = BTreeMap::new();
        outer.insert(self.variant.to_string(), PropValue::Map(self.map));
        Ok(PropValue::Map(outer))
    }
}
