//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - bool: Boolean
//! - timestamp: ISO-8601 string on the wire, UTC instant in storage
//! - object: Nested object with field schema
//! - array: Homogeneous array with element type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::ID_FIELD;

/// Supported field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// ISO-8601 input, stored as an instant
    Timestamp,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: BTreeMap<String, FieldDef>,
    },
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        #[serde(rename = "element_type")]
        element_type: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }

    /// Builds an object type from `(name, def)` pairs.
    pub fn object<const N: usize>(fields: [(&str, FieldDef); N]) -> Self {
        FieldType::Object {
            fields: fields
                .into_iter()
                .map(|(name, def)| (name.to_string(), def))
                .collect(),
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether field must be present
    pub required: bool,
    /// Substituted when an optional field is absent or null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldDef {
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            default: None,
        }
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::required(FieldType::String)
    }

    /// Create an optional string field defaulting to `""`
    pub fn optional_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: false,
            default: Some(serde_json::Value::String(String::new())),
        }
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self::required(FieldType::Int)
    }

    /// Create a required bool field
    pub fn required_bool() -> Self {
        Self::required(FieldType::Bool)
    }

    /// Create a required timestamp field
    pub fn required_timestamp() -> Self {
        Self::required(FieldType::Timestamp)
    }

    /// Create a required array field
    pub fn required_array(element_type: FieldType) -> Self {
        Self::required(FieldType::Array {
            element_type: Box::new(element_type),
        })
    }
}

/// Complete schema for one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Collection the schema governs
    pub collection: String,
    /// Field definitions, `_id` excluded
    pub fields: BTreeMap<String, FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new<const N: usize>(collection: impl Into<String>, fields: [(&str, FieldDef); N]) -> Self {
        Self {
            collection: collection.into(),
            fields: fields
                .into_iter()
                .map(|(name, def)| (name.to_string(), def))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        // The identifier is managed by the validator, never declared
        if self.fields.contains_key(ID_FIELD) {
            return Err(format!("Schema '{}' must not declare '{}'", self.collection, ID_FIELD));
        }

        for (name, def) in &self.fields {
            if def.required && def.default.is_some() {
                return Err(format!("Required field '{}' cannot carry a default", name));
            }
            if !def.required && def.default.is_none() {
                return Err(format!("Optional field '{}' needs a default", name));
            }
            if let FieldType::Object { fields } = &def.field_type {
                if fields.is_empty() {
                    return Err(format!("Object field '{}' declares no fields", name));
                }
            }
        }

        Ok(())
    }
}
