//! HTTP Server Configuration
//!
//! Host, port, CORS, body limit, log level and the document store backend.
//! Values come from an optional JSON file; command-line arguments and
//! environment variables override them.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;

use axum::http::{HeaderValue, Uri};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Body limit must be greater than zero")]
    ZeroBodyLimit,

    #[error("Invalid CORS origin '{0}': expected scheme://host[:port] or *")]
    InvalidCorsOrigin(String),

    #[error("MongoDB host must not be empty")]
    EmptyMongoHost,

    #[error("Invalid database name '{0}'")]
    InvalidDatabase(String),
}

/// Where documents are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB database, persistent
    #[default]
    Mongo,
    /// Process memory, lost on exit
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Mongo => "mongo",
            StoreBackend::Memory => "memory",
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest accepted request body in bytes (default: 2 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Minimum log severity (default: "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Document store backend (default: mongo)
    #[serde(default)]
    pub store: StoreBackend,

    /// MongoDB host (default: "localhost")
    #[serde(default = "default_mongo_host")]
    pub mongo_host: String,

    /// MongoDB port (default: 27017)
    #[serde(default = "default_mongo_port")]
    pub mongo_port: u16,

    /// Database holding the collections (default: "test")
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_log_level() -> String {
    Severity::Info.as_str().to_string()
}

fn default_mongo_host() -> String {
    "localhost".to_string()
}

fn default_mongo_port() -> u16 {
    27017
}

fn default_database() -> String {
    "test".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_body_bytes: default_max_body_bytes(),
            log_level: default_log_level(),
            store: StoreBackend::default(),
            mongo_host: default_mongo_host(),
            mongo_port: default_mongo_port(),
            database: default_database(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load a config file; absent keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.socket_addr();
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    /// Parsed minimum log severity
    pub fn severity(&self) -> Result<Severity, ConfigError> {
        self.log_level.parse().map_err(ConfigError::InvalidLogLevel)
    }

    /// Connection string for the MongoDB backend
    pub fn mongo_uri(&self) -> String {
        format!("mongodb://{}:{}", self.mongo_host, self.mongo_port)
    }

    /// Configured origins as header values. `*` among them allows any
    /// origin and yields `None`.
    pub fn cors_origin_values(&self) -> Result<Option<Vec<HeaderValue>>, ConfigError> {
        if self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*") {
            return Ok(None);
        }
        self.cors_origins
            .iter()
            .map(|origin| parse_origin(origin))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Checks every field that can only fail at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        self.severity()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        for origin in self.cors_origins.iter().filter(|o| o.as_str() != "*") {
            parse_origin(origin)?;
        }
        if self.store == StoreBackend::Mongo {
            if self.mongo_host.trim().is_empty() {
                return Err(ConfigError::EmptyMongoHost);
            }
            let bad_name = self.database.is_empty()
                || self.database.chars().any(|c| matches!(c, '/' | '\\' | '.' | ' ' | '"' | '$'));
            if bad_name {
                return Err(ConfigError::InvalidDatabase(self.database.clone()));
            }
        }
        Ok(())
    }
}

/// An origin is `scheme://host[:port]`, with no path, query or trailing slash.
fn parse_origin(origin: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = || ConfigError::InvalidCorsOrigin(origin.to_string());

    let uri: Uri = origin.parse().map_err(|_| invalid())?;
    let has_path = origin.ends_with('/') || !matches!(uri.path(), "" | "/");
    if uri.scheme().is_none() || uri.authority().is_none() || has_path || uri.query().is_some() {
        return Err(invalid());
    }
    HeaderValue::from_str(origin).map_err(|_| invalid())
}
