//! Validation error types
//!
//! Error codes:
//! - VALIDATION_NOT_AN_OBJECT
//! - VALIDATION_MISSING_FIELD
//! - VALIDATION_TYPE_MISMATCH
//! - VALIDATION_INVALID_TIMESTAMP
//! - VALIDATION_INVALID_IDENTIFIER
//! - VALIDATION_EMPTY_PATCH

use std::fmt;

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Payload is not a JSON object
    NotAnObject,
    /// Required field absent or null
    MissingField,
    /// Field present with the wrong JSON type
    TypeMismatch,
    /// Timestamp string could not be parsed
    InvalidTimestamp,
    /// `_id` has the wrong type or is empty where one is needed
    InvalidIdentifier,
    /// Update carries no field to set
    EmptyPatch,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::NotAnObject => "VALIDATION_NOT_AN_OBJECT",
            SchemaErrorCode::MissingField => "VALIDATION_MISSING_FIELD",
            SchemaErrorCode::TypeMismatch => "VALIDATION_TYPE_MISMATCH",
            SchemaErrorCode::InvalidTimestamp => "VALIDATION_INVALID_TIMESTAMP",
            SchemaErrorCode::InvalidIdentifier => "VALIDATION_INVALID_IDENTIFIER",
            SchemaErrorCode::EmptyPatch => "VALIDATION_EMPTY_PATCH",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "list[2].active")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Validation error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    /// Collection the payload was validated for
    collection: String,
    details: ValidationDetails,
}

impl SchemaError {
    pub fn new(code: SchemaErrorCode, collection: impl Into<String>, details: ValidationDetails) -> Self {
        Self {
            code,
            collection: collection.into(),
            details,
        }
    }

    pub fn not_an_object(collection: impl Into<String>, actual: &str) -> Self {
        Self::new(
            SchemaErrorCode::NotAnObject,
            collection,
            ValidationDetails::new("$root", "object", actual),
        )
    }

    pub fn missing_field(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MissingField,
            collection,
            ValidationDetails::missing_field(field),
        )
    }

    pub fn null_value(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MissingField,
            collection,
            ValidationDetails::null_value(field),
        )
    }

    pub fn type_mismatch(
        collection: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            SchemaErrorCode::TypeMismatch,
            collection,
            ValidationDetails::new(field, expected, actual),
        )
    }

    pub fn invalid_timestamp(collection: impl Into<String>, field: impl Into<String>, input: &str) -> Self {
        Self::new(
            SchemaErrorCode::InvalidTimestamp,
            collection,
            ValidationDetails::new(field, "ISO-8601 timestamp", format!("'{}'", input)),
        )
    }

    pub fn invalid_identifier(collection: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::InvalidIdentifier,
            collection,
            ValidationDetails::new("_id", "non-empty string", actual),
        )
    }

    pub fn empty_patch(collection: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::EmptyPatch,
            collection,
            ValidationDetails::new("$root", "at least one field to update", "none"),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn details(&self) -> &ValidationDetails {
        &self.details
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: invalid {} payload, {}", self.code, self.collection, self.details)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for validation
pub type SchemaResult<T> = Result<T, SchemaError>;
