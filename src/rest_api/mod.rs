//! # REST API Module
//!
//! JSON-over-POST CRUD endpoints for every registered entity kind.
//! Handlers are stateless; the only shared state is the injected store.

pub mod errors;
pub mod handler;
pub mod response;
pub mod server;

pub use errors::{ApiError, ApiResult};
pub use handler::{Gateway, Operation};
pub use response::{DeleteResponse, InsertResponse, UpdateResponse};
pub use server::RestServer;
