//! # Store Adapter
//!
//! The gateway talks to its document store only through [`DocumentStore`].
//! The store is constructed by the caller and injected: `serve` picks
//! [`MongoStore`] or [`InMemoryStore`] from configuration, tests use the
//! in-memory one. Operations are blocking.

mod errors;
mod filter;
mod memory;
mod mongo;

pub use errors::{StoreError, StoreResult};
pub use filter::{Filter, FilterExpr, FilterOperator};
pub use memory::InMemoryStore;
pub use mongo::MongoStore;

use crate::document::Document;

/// Document collection operations
pub trait DocumentStore: Send + Sync {
    /// Documents in `collection` matching `filter`, in identifier order
    fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Insert a document keyed by its `_id`; returns that identifier
    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<String>;

    /// Set `set`'s fields on the first matching document; returns the matched count
    fn update_one(&self, collection: &str, filter: &Filter, set: &Document) -> StoreResult<u64>;

    /// Remove the first matching document; returns the deleted count
    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}
