//! Context building: one host object in, one [`SafeVariableSet`] out.

use crate::{
    error::{Error, Result},
    expose::{Expose, FieldCollector, FieldVisitor, ToSafe},
    value::SafeValue,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A host-side mapping from names to convertible values.
pub trait Mapping {
    /// Hands every entry to `visitor`, in the mapping's iteration order.
    fn visit_entries(&self, visitor: &mut dyn FieldVisitor);
}

impl<V: ToSafe, S: BuildHasher> Mapping for HashMap<String, V, S> {
    fn visit_entries(&self, visitor: &mut dyn FieldVisitor) {
        for (key, value) in self {
            visitor.visit(key, value);
        }
    }
}

impl<V: ToSafe> Mapping for BTreeMap<String, V> {
    fn visit_entries(&self, visitor: &mut dyn FieldVisitor) {
        for (key, value) in self {
            visitor.visit(key, value);
        }
    }
}

impl<V: ToSafe, S: BuildHasher> Mapping for IndexMap<String, V, S> {
    fn visit_entries(&self, visitor: &mut dyn FieldVisitor) {
        for (key, value) in self {
            visitor.visit(key, value);
        }
    }
}

impl Mapping for serde_json::Map<String, serde_json::Value> {
    fn visit_entries(&self, visitor: &mut dyn FieldVisitor) {
        for (key, value) in self {
            visitor.visit(key, value);
        }
    }
}

/// The data object handed to a single render call.
#[derive(Clone, Copy)]
pub enum RenderInput<'a> {
    /// No data was supplied.
    Missing,
    Mapping(&'a dyn Mapping),
    Object(&'a dyn Expose),
    Json(&'a serde_json::Value),
}

impl<'a> RenderInput<'a> {
    pub fn mapping(mapping: &'a dyn Mapping) -> Self {
        RenderInput::Mapping(mapping)
    }

    pub fn object(object: &'a dyn Expose) -> Self {
        RenderInput::Object(object)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RenderInput::Missing | RenderInput::Json(serde_json::Value::Null))
    }
}

impl<'a> From<&'a serde_json::Value> for RenderInput<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        RenderInput::Json(value)
    }
}

impl<'a> From<&'a dyn Mapping> for RenderInput<'a> {
    fn from(mapping: &'a dyn Mapping) -> Self {
        RenderInput::Mapping(mapping)
    }
}

impl<'a> From<&'a dyn Expose> for RenderInput<'a> {
    fn from(object: &'a dyn Expose) -> Self {
        RenderInput::Object(object)
    }
}

impl<'a, T: Into<RenderInput<'a>>> From<Option<T>> for RenderInput<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(RenderInput::Missing, Into::into)
    }
}

/// Template-visible variables for one render call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SafeVariableSet {
    variables: IndexMap<String, SafeValue>,
}

impl SafeVariableSet {
    pub fn get(&self, name: &str) -> Option<&SafeValue> {
        self.variables.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SafeValue)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Builds the root context value handed to the evaluator.
    pub fn to_template_context(&self) -> minijinja::Value {
        minijinja::Value::from_iter(
            self.variables.iter().map(|(k, v)| (k.as_str(), v.to_template_value())),
        )
    }
}

impl From<IndexMap<String, SafeValue>> for SafeVariableSet {
    fn from(variables: IndexMap<String, SafeValue>) -> Self {
        Self { variables }
    }
}

impl<'a> IntoIterator for &'a SafeVariableSet {
    type Item = (&'a String, &'a SafeValue);
    type IntoIter = indexmap::map::Iter<'a, String, SafeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

/// Converts `input` into a [`SafeVariableSet`].
///
/// Mappings keep their keys, structured objects contribute their exposed
/// members, and every value passes through [`ToSafe`]. A missing input is an
/// [`Error::InvalidArgument`].
pub fn build_context(input: RenderInput<'_>) -> Result<SafeVariableSet> {
    let mut collector = FieldCollector::default();
    match input {
        RenderInput::Missing | RenderInput::Json(serde_json::Value::Null) => {
            return Err(Error::invalid_argument("data", "no render data was supplied"));
        }
        RenderInput::Mapping(mapping) => mapping.visit_entries(&mut collector),
        RenderInput::Object(object) => {
            debug!("Building context from exposed members of '{}'", object.type_name());
            object.visit_fields(&mut collector);
        }
        RenderInput::Json(serde_json::Value::Object(map)) => map.visit_entries(&mut collector),
        RenderInput::Json(other) => {
            warn!("Render data is a JSON {} with no named members", json_kind(other));
        }
    }
    debug!("Built context with {} variable(s)", collector.fields.len());
    Ok(SafeVariableSet::from(collector.fields))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
