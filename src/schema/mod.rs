//! Schema subsystem
//!
//! Every write is checked against the schema of its entity before it reaches
//! the store.
//!
//! # Design Principles
//!
//! - One generic validator, parameterized by a per-entity schema
//! - Required fields must be present, non-null and correctly typed
//! - Optional fields carry an explicit default
//! - No implicit coercion, except ISO-8601 strings into timestamp fields
//! - Deterministic validation

mod errors;
mod registry;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ValidationDetails};
pub use registry::{EntityKind, FlagFacet, IntervalScope, ListScope};
pub use types::{FieldDef, FieldType, Schema};
pub use validator::{Patch, SchemaValidator};

pub(crate) use validator::{json_type_name, required_id};
