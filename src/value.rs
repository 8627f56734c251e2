//! The closed set of values a template is allowed to observe.
//!
//! Everything handed to the evaluator is a [`SafeValue`]. Host objects only
//! appear as [`SafeRecord`]s, which answer field lookups and enumeration and
//! nothing else.

use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// A template-visible value.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Seq(Vec<SafeValue>),
    Map(IndexMap<String, SafeValue>),
    /// Read-only view over the exposed members of a host object.
    Record(Arc<SafeRecord>),
    /// Display form of a value that could not be decomposed.
    Opaque(String),
}

impl SafeValue {
    /// Converts into the evaluator's value type.
    pub fn to_template_value(&self) -> Value {
        match self {
            SafeValue::Null => Value::from(()),
            SafeValue::Bool(b) => Value::from(*b),
            SafeValue::Int(i) => Value::from(*i),
            SafeValue::Float(f) => Value::from(*f),
            SafeValue::Str(s) => Value::from(s.as_str()),
            SafeValue::DateTime(dt) => Value::from(dt.to_rfc3339()),
            SafeValue::Date(d) => Value::from(d.format("%Y-%m-%d").to_string()),
            SafeValue::Seq(items) => {
                Value::from(items.iter().map(SafeValue::to_template_value).collect::<Vec<_>>())
            }
            SafeValue::Map(map) => Value::from_iter(
                map.iter().map(|(k, v)| (k.as_str(), v.to_template_value())),
            ),
            SafeValue::Record(record) => Value::from_dyn_object(Arc::clone(record)),
            SafeValue::Opaque(display) => Value::from(display.as_str()),
        }
    }

    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            SafeValue::Null => "null",
            SafeValue::Bool(_) => "bool",
            SafeValue::Int(_) => "int",
            SafeValue::Float(_) => "float",
            SafeValue::Str(_) => "string",
            SafeValue::DateTime(_) => "datetime",
            SafeValue::Date(_) => "date",
            SafeValue::Seq(_) => "sequence",
            SafeValue::Map(_) => "map",
            SafeValue::Record(_) => "record",
            SafeValue::Opaque(_) => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SafeValue::Str(s) | SafeValue::Opaque(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&SafeRecord> {
        match self {
            SafeValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SafeValue::Null)
    }
}

impl From<serde_json::Value> for SafeValue {
    fn from(value: serde_json::Value) -> Self {
        SafeValue::from(&value)
    }
}

impl From<&serde_json::Value> for SafeValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SafeValue::Null,
            serde_json::Value::Bool(b) => SafeValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SafeValue::Int(i),
                None => SafeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => SafeValue::Str(s.clone()),
            serde_json::Value::Array(items) => {
                SafeValue::Seq(items.iter().map(SafeValue::from).collect())
            }
            serde_json::Value::Object(map) => SafeValue::Map(
                map.iter().map(|(k, v)| (k.clone(), SafeValue::from(v))).collect(),
            ),
        }
    }
}

impl Serialize for SafeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SafeValue::Null => serializer.serialize_unit(),
            SafeValue::Bool(b) => serializer.serialize_bool(*b),
            SafeValue::Int(i) => serializer.serialize_i64(*i),
            SafeValue::Float(f) => serializer.serialize_f64(*f),
            SafeValue::Str(s) | SafeValue::Opaque(s) => serializer.serialize_str(s),
            SafeValue::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            SafeValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            SafeValue::Seq(items) => serializer.collect_seq(items),
            SafeValue::Map(map) => serializer.collect_map(map),
            SafeValue::Record(record) => record.as_ref().serialize(serializer),
        }
    }
}

/// Restricted accessor over a host object's exposed members.
///
/// Implements the evaluator's object protocol with field lookup and
/// enumeration only. Method calls fall through to the protocol's default,
/// which fails with an unknown-method error.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeRecord {
    type_name: String,
    fields: IndexMap<String, SafeValue>,
}

impl SafeRecord {
    pub fn new(type_name: impl Into<String>, fields: IndexMap<String, SafeValue>) -> Self {
        Self { type_name: type_name.into(), fields }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&SafeValue> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Object for SafeRecord {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.fields.get(key.as_str()?).map(SafeValue::to_template_value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.fields.keys().map(|k| Value::from(k.as_str())).collect())
    }
}

impl Serialize for SafeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
