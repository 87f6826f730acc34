//! CLI command implementations
//!
//! `serve` resolves configuration, installs the log level, opens the
//! configured store and blocks on the HTTP server. `schemas` prints the
//! entity registry.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::http_server::{HttpServer, HttpServerConfig, StoreBackend};
use crate::observability::{Event, Logger};
use crate::schema::EntityKind;
use crate::store::{DocumentStore, InMemoryStore, MongoStore};

use super::args::{Cli, Command, ServeArgs};
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve(args) => serve(&args),
        Command::Schemas { entity } => schemas(entity.as_deref()),
    }
}

/// Config file (if any), then argument and environment overrides.
pub fn resolve_config(args: &ServeArgs) -> CliResult<HttpServerConfig> {
    let mut config = match &args.config {
        Some(path) => HttpServerConfig::from_file(path).map_err(|e| {
            CliError::config_error(format!("{}: {}", path.display(), e))
        })?,
        None => HttpServerConfig::default(),
    };

    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Serve the gateway until interrupted
pub fn serve(args: &ServeArgs) -> CliResult<()> {
    Logger::info(
        Event::BootStart.as_str(),
        &[("version", env!("CARGO_PKG_VERSION"))],
    );

    let config = resolve_config(args)?;
    Logger::set_min_severity(config.severity()?);

    let cors = if config.cors_origins.is_empty() {
        "*".to_string()
    } else {
        config.cors_origins.join(",")
    };
    let max_body = config.max_body_bytes.to_string();
    Logger::info(
        Event::ConfigLoaded.as_str(),
        &[
            ("addr", config.socket_addr().as_str()),
            ("cors_origins", cors.as_str()),
            ("log_level", config.log_level.as_str()),
            ("max_body_bytes", max_body.as_str()),
            ("store", config.store.as_str()),
        ],
    );

    let store = open_store(&config)?;
    let server = HttpServer::with_config(config, store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Opens the configured backend. MongoDB must answer a ping before serving.
pub fn open_store(config: &HttpServerConfig) -> CliResult<Arc<dyn DocumentStore>> {
    match config.store {
        StoreBackend::Memory => {
            Logger::info(
                Event::StoreConnected.as_str(),
                &[("backend", config.store.as_str())],
            );
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Mongo => {
            let uri = config.mongo_uri();
            let store = MongoStore::connect(&uri, &config.database)
                .map_err(|e| CliError::boot_failed(format!("Cannot open MongoDB at {}: {}", uri, e)))?;
            Logger::info(
                Event::StoreConnected.as_str(),
                &[
                    ("backend", config.store.as_str()),
                    ("database", store.database_name()),
                    ("uri", uri.as_str()),
                ],
            );
            Ok(Arc::new(store))
        }
    }
}

/// Print entity schemas to stdout
pub fn schemas(entity: Option<&str>) -> CliResult<()> {
    write_json(&schemas_json(entity)?)
}

/// Registry description keyed by route prefix
pub fn schemas_json(entity: Option<&str>) -> CliResult<Value> {
    let kinds: Vec<EntityKind> = match entity {
        Some(prefix) => {
            let kind = EntityKind::from_route_prefix(prefix).ok_or_else(|| CliError::unknown_entity(prefix))?;
            vec![kind]
        }
        None => EntityKind::ALL.to_vec(),
    };

    let mut out = Map::new();
    for kind in kinds {
        out.insert(
            kind.route_prefix().to_string(),
            json!({
                "collection": kind.collection(),
                "label": kind.label(),
                "list_scope": serde_json::to_value(kind.list_scope())?,
                "fields": serde_json::to_value(&kind.schema().fields)?,
            }),
        );
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_schemas_json_lists_every_entity() {
        let value = schemas_json(None).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        assert_eq!(obj["vgameConfig"]["collection"], "gameConfigs");
        assert_eq!(obj["vevent"]["fields"]["start"]["type"], "timestamp");
        assert_eq!(obj["vevent"]["fields"]["start"]["required"], true);
        assert_eq!(obj["vnote"]["list_scope"]["kind"], "owner");
    }

    #[test]
    fn test_schemas_json_single_entity() {
        let value = schemas_json(Some("vrecipe")).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert_eq!(value["vrecipe"]["label"], "Recipe");

        let err = schemas_json(Some("vnothing")).unwrap_err();
        assert_eq!(err.code_str(), "DOCGATE_CLI_UNKNOWN_ENTITY");
    }

    #[test]
    fn test_resolve_config_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 9100, "host": "0.0.0.0"}}"#).unwrap();

        let args = ServeArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(9200),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9200);
    }

    #[test]
    fn test_open_memory_store() {
        let config = HttpServerConfig {
            store: StoreBackend::Memory,
            ..Default::default()
        };
        let store = open_store(&config).unwrap();
        assert!(store.find("events", &crate::store::Filter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_config_rejects_bad_origin() {
        let args = ServeArgs {
            cors_origins: vec!["localhost:5173".to_string()],
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert_eq!(err.code_str(), "DOCGATE_CLI_CONFIG_ERROR");
        assert!(err.to_string().contains("localhost:5173"));
    }

    #[test]
    fn test_resolve_config_rejects_bad_level() {
        let args = ServeArgs {
            log_level: Some("chatty".to_string()),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert_eq!(err.code_str(), "DOCGATE_CLI_CONFIG_ERROR");
    }
}
