//! # HTTP Server
//!
//! Combines the entity routes and the health route behind CORS and a request
//! body limit.

use std::io;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use crate::observability::{Event, Logger};
use crate::rest_api::RestServer;
use crate::schema::EntityKind;
use crate::store::DocumentStore;

/// HTTP server for the document gateway
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over `store` with default configuration
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(HttpServerConfig::default(), store)
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, store: Arc<dyn DocumentStore>) -> Router {
        Router::new()
            .merge(health_routes())
            .merge(RestServer::new(store).router())
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(Self::cors_layer(config))
    }

    /// Any origin when none are configured, else exactly the configured list.
    ///
    /// A list that fails `HttpServerConfig::validate` is logged and allows
    /// no cross-origin requests.
    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        let allow_origin = match config.cors_origin_values() {
            Ok(None) => AllowOrigin::from(Any),
            Ok(Some(origins)) => AllowOrigin::list(origins),
            Err(e) => {
                let reason = e.to_string();
                Logger::error(Event::ConfigLoaded.as_str(), &[("reason", reason.as_str())]);
                AllowOrigin::list(Vec::new())
            }
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), io::Error> {
        let addr = self
            .config
            .listen_addr()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let listener = TcpListener::bind(addr).await?;

        let bound = listener.local_addr()?.to_string();
        let routes = (EntityKind::ALL.len() * 4).to_string();
        Logger::info(
            Event::ServerListening.as_str(),
            &[("addr", bound.as_str()), ("entity_routes", routes.as_str())],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Logger::info(Event::ServerStopped.as_str(), &[("addr", bound.as_str())]);
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        let reason = e.to_string();
        Logger::warn(Event::ServerStopped.as_str(), &[("reason", reason.as_str())]);
    }
}
