//! docgate - A JSON REST gateway over schema-checked document collections

pub mod cli;
pub mod document;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod rest_api;
pub mod schema;
pub mod store;
