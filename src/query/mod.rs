//! Query translation
//!
//! Maps validated request payloads to store filters and write expressions.

mod builder;

pub use builder::{DeleteQuery, InsertQuery, QueryBuilder, UpdateQuery};
