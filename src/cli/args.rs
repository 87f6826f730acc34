//! CLI argument definitions using clap
//!
//! Commands:
//! - docgate serve [--config <path>] [--host <host>] [--port <port>] ...
//! - docgate schemas [--entity <prefix>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::http_server::{HttpServerConfig, StoreBackend};

/// docgate - JSON REST gateway over schema-checked document collections
#[derive(Parser, Debug)]
#[command(name = "docgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the REST gateway over HTTP
    Serve(ServeArgs),

    /// Print the entity schemas as JSON and exit
    Schemas {
        /// Only this entity, by route prefix (e.g. "vevent")
        #[arg(long)]
        entity: Option<String>,
    },
}

/// Server overrides; each wins over the config file
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Path to a JSON configuration file
    #[arg(long, env = "DOCGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "DOCGATE_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long, env = "DOCGATE_PORT")]
    pub port: Option<u16>,

    /// Allowed CORS origin; repeat or comma-separate. None allows any origin
    #[arg(long = "cors-origin", env = "DOCGATE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Minimum log severity (TRACE, INFO, WARN, ERROR, FATAL)
    #[arg(long, env = "DOCGATE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    /// Document store backend
    #[arg(long, value_enum, env = "DOCGATE_STORE")]
    pub store: Option<StoreBackend>,

    /// MongoDB host
    #[arg(long, env = "MONGO_HOST")]
    pub mongo_host: Option<String>,

    /// MongoDB port
    #[arg(long, env = "MONGO_PORT")]
    pub mongo_port: Option<u16>,

    /// Database holding the collections
    #[arg(long, env = "DOCGATE_DATABASE")]
    pub database: Option<String>,
}

impl ServeArgs {
    /// Applies the supplied overrides on top of `config`.
    pub fn apply(&self, config: &mut HttpServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if !self.cors_origins.is_empty() {
            config.cors_origins = self.cors_origins.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(limit) = self.max_body_bytes {
            config.max_body_bytes = limit;
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(host) = &self.mongo_host {
            config.mongo_host = host.clone();
        }
        if let Some(port) = self.mongo_port {
            config.mongo_port = port;
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
