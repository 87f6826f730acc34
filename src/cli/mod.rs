//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP gateway
//! - schemas: Print the entity schemas

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ServeArgs};
pub use commands::{resolve_config, run, run_command, schemas, schemas_json, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;
