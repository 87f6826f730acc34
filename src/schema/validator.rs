//! Schema validator turning untyped JSON into typed documents
//!
//! Create semantics:
//! - All required fields are present, non-null and of the declared type
//! - Optional fields absent or null take their declared default
//! - Timestamp fields are parsed; unparsable strings are rejected
//! - Undeclared fields are dropped
//! - `_id` absent, null or empty is replaced by a generated identifier
//!
//! Patch semantics:
//! - `_id` is required and selects the target, it is never part of the patch
//! - Declared fields are checked and coerced with the create rules
//! - Undeclared fields are dropped
//! - A patch left with no fields is rejected

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldType, Schema};
use crate::document::{generate_id, parse_timestamp, DocValue, Document, ID_FIELD};

/// A checked merge-patch for one document
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Identifier of the target document
    pub id: String,
    /// Fields to set, already coerced
    pub set: Document,
}

/// Schema validator that checks payloads against one schema.
///
/// Validation is deterministic apart from identifier generation.
/// The input payload is never mutated.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator for the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates a create payload and returns the document to insert.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the payload is not an object, a required
    /// field is missing or null, a field has the wrong type, a timestamp does
    /// not parse, or `_id` is neither absent nor a string.
    pub fn validate_create(&self, payload: &Value) -> SchemaResult<Document> {
        let obj = self.expect_object(payload)?;

        let id = match obj.get(ID_FIELD) {
            None | Some(Value::Null) => generate_id(),
            Some(Value::String(s)) if s.is_empty() => generate_id(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(SchemaError::invalid_identifier(
                    &self.schema.collection,
                    json_type_name(other),
                ))
            }
        };

        let mut document = self.validate_object(obj, &self.schema.fields, "")?;
        document.insert(ID_FIELD, DocValue::String(id));
        Ok(document)
    }

    /// Validates an update payload and returns the patch to apply.
    pub fn validate_patch(&self, payload: &Value) -> SchemaResult<Patch> {
        let obj = self.expect_object(payload)?;

        let id = required_id(&self.schema.collection, obj)?;

        let mut set = Document::new();
        for (field_name, value) in obj {
            if field_name == ID_FIELD {
                continue;
            }
            let Some(field_def) = self.schema.field(field_name) else {
                continue;
            };
            let coerced = self.validate_field(Some(value), field_def, field_name)?;
            set.insert(field_name.clone(), coerced);
        }

        if set.is_empty() {
            return Err(SchemaError::empty_patch(&self.schema.collection));
        }

        Ok(Patch { id, set })
    }

    fn expect_object<'v>(&self, payload: &'v Value) -> SchemaResult<&'v Map<String, Value>> {
        payload
            .as_object()
            .ok_or_else(|| SchemaError::not_an_object(&self.schema.collection, json_type_name(payload)))
    }

    /// Validates an object against field definitions, keeping declared fields only.
    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &BTreeMap<String, FieldDef>,
        path_prefix: &str,
    ) -> SchemaResult<Document> {
        let mut document = Document::new();

        for (field_name, field_def) in fields {
            let field_path = make_path(path_prefix, field_name);
            let value = self.validate_field(obj.get(field_name), field_def, &field_path)?;
            document.insert(field_name.clone(), value);
        }

        Ok(document)
    }

    /// Applies presence rules, then type rules, to a single field.
    fn validate_field(
        &self,
        value: Option<&Value>,
        field_def: &FieldDef,
        field_path: &str,
    ) -> SchemaResult<DocValue> {
        match value {
            Some(Value::Null) | None if field_def.required => Err(match value {
                Some(_) => SchemaError::null_value(&self.schema.collection, field_path),
                None => SchemaError::missing_field(&self.schema.collection, field_path),
            }),
            Some(Value::Null) | None => Ok(field_def
                .default
                .as_ref()
                .map(DocValue::from_json)
                .unwrap_or(DocValue::Null)),
            Some(value) => self.validate_value(value, &field_def.field_type, field_path),
        }
    }

    /// Validates a value against a field type and converts it.
    fn validate_value(
        &self,
        value: &Value,
        expected_type: &FieldType,
        field_path: &str,
    ) -> SchemaResult<DocValue> {
        match expected_type {
            FieldType::String => match value {
                Value::String(s) => Ok(DocValue::String(s.clone())),
                _ => Err(self.type_error(field_path, "string", value)),
            },
            FieldType::Int => value
                .as_i64()
                .map(DocValue::Int)
                .ok_or_else(|| self.type_error(field_path, "int", value)),
            FieldType::Bool => value
                .as_bool()
                .map(DocValue::Bool)
                .ok_or_else(|| self.type_error(field_path, "bool", value)),
            FieldType::Timestamp => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| self.type_error(field_path, "timestamp", value))?;
                parse_timestamp(raw)
                    .map(DocValue::Timestamp)
                    .ok_or_else(|| {
                        SchemaError::invalid_timestamp(&self.schema.collection, field_path, raw)
                    })
            }
            FieldType::Object { fields } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| self.type_error(field_path, "object", value))?;
                self.validate_object(obj, fields, field_path)
                    .map(DocValue::Object)
            }
            FieldType::Array { element_type } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| self.type_error(field_path, "array", value))?;

                let mut items = Vec::with_capacity(arr.len());
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}[{}]", field_path, i);

                    if elem.is_null() {
                        return Err(SchemaError::null_value(&self.schema.collection, elem_path));
                    }

                    items.push(self.validate_value(elem, element_type, &elem_path)?);
                }
                Ok(DocValue::Array(items))
            }
        }
    }

    fn type_error(&self, field_path: &str, expected: &str, actual: &Value) -> SchemaError {
        SchemaError::type_mismatch(
            &self.schema.collection,
            field_path,
            expected,
            json_type_name(actual),
        )
    }
}

/// Extracts the identifier that selects an existing document.
pub(crate) fn required_id(collection: &str, obj: &Map<String, Value>) -> SchemaResult<String> {
    match obj.get(ID_FIELD) {
        None | Some(Value::Null) => Err(SchemaError::missing_field(collection, ID_FIELD)),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(SchemaError::invalid_identifier(collection, "empty string")),
        Some(other) => Err(SchemaError::invalid_identifier(collection, json_type_name(other))),
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
