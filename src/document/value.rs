//! Typed document values
//!
//! A stored document is a key-ordered map of field name to [`DocValue`].
//! Timestamps are a value kind of their own so that range filters compare
//! instants, not strings.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::time::format_timestamp;

/// Field name of the document identifier
pub const ID_FIELD: &str = "_id";

/// A single value inside a document
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// UTC instant at millisecond precision
    Timestamp(DateTime<Utc>),
    Array(Vec<DocValue>),
    Object(Document),
}

impl DocValue {
    /// Converts untyped JSON into a document value.
    ///
    /// Strings stay strings; only the validator turns strings into timestamps.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => DocValue::Null,
            Value::Bool(b) => DocValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DocValue::Int(i),
                None => DocValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => DocValue::String(s.clone()),
            Value::Array(items) => DocValue::Array(items.iter().map(DocValue::from_json).collect()),
            Value::Object(map) => DocValue::Object(Document::from_json_map(map)),
        }
    }

    /// Renders the value as JSON. Timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            DocValue::Null => Value::Null,
            DocValue::Bool(b) => Value::Bool(*b),
            DocValue::Int(i) => Value::Number((*i).into()),
            DocValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            DocValue::String(s) => Value::String(s.clone()),
            DocValue::Timestamp(ts) => Value::String(format_timestamp(ts)),
            DocValue::Array(items) => Value::Array(items.iter().map(DocValue::to_json).collect()),
            DocValue::Object(doc) => doc.to_json(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two values of the same kind.
    ///
    /// Integers and floats compare numerically with each other. Values of
    /// different kinds are unordered and never satisfy a range predicate.
    pub fn compare(&self, other: &DocValue) -> Option<Ordering> {
        match (self, other) {
            (DocValue::Int(a), DocValue::Int(b)) => Some(a.cmp(b)),
            (DocValue::Int(a), DocValue::Float(b)) => (*a as f64).partial_cmp(b),
            (DocValue::Float(a), DocValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (DocValue::Float(a), DocValue::Float(b)) => a.partial_cmp(b),
            (DocValue::String(a), DocValue::String(b)) => Some(a.cmp(b)),
            (DocValue::Timestamp(a), DocValue::Timestamp(b)) => Some(a.cmp(b)),
            (DocValue::Bool(a), DocValue::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality as used by `Eq` and `In` filters.
    pub fn matches(&self, other: &DocValue) -> bool {
        match self.compare(other) {
            Some(ordering) => ordering == Ordering::Equal,
            None => self == other,
        }
    }
}

impl Serialize for DocValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A key-ordered set of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, DocValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        Self {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), DocValue::from_json(v)))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&DocValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: DocValue) -> Option<DocValue> {
        self.fields.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<DocValue> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// The identifier, when present as a string.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD).and_then(DocValue::as_str)
    }

    /// Overwrites this document's fields with every field in `patch`.
    ///
    /// The identifier is never touched.
    pub fn merge(&mut self, patch: &Document) {
        for (field, value) in patch.iter() {
            if field == ID_FIELD {
                continue;
            }
            self.fields.insert(field.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DocValue)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, DocValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, DocValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
