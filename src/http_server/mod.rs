//! # HTTP Server Module
//!
//! Axum server hosting the gateway.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/{prefix}/{get,new,edit,delete}` - Entity operations, all `POST`

pub mod config;
pub mod observability_routes;
pub mod server;

pub use config::{ConfigError, HttpServerConfig, StoreBackend};
pub use server::HttpServer;
