//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a document store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A document with this identifier already exists
    #[error("Duplicate key: '{id}' already exists in {collection}")]
    DuplicateKey { collection: String, id: String },

    /// Document handed to insert has no string identifier
    #[error("Document for {0} has no identifier")]
    MissingId(String),

    /// Store cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
