//! # REST API HTTP Server
//!
//! Axum routes for the entity endpoints. Every entity gets
//! `POST /{prefix}/get`, `/new`, `/edit` and `/delete`. Store access is
//! blocking, so each request runs on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::schema::EntityKind;
use crate::store::DocumentStore;

use super::errors::ApiError;
use super::handler::{Gateway, Operation};

/// REST API server state
pub struct RestServer {
    gateway: Gateway,
}

impl RestServer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            gateway: Gateway::new(store),
        }
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        let state = Arc::new(self.gateway);

        let mut router = Router::new();
        for kind in EntityKind::ALL {
            for op in Operation::ALL {
                let path = format!("/{}/{}", kind.route_prefix(), op.path_segment());
                router = router.route(
                    &path,
                    post(move |State(gateway): State<ServerState>, body: Bytes| async move {
                        dispatch(gateway, kind, op, body).await
                    }),
                );
            }
        }

        router.with_state(state)
    }
}

/// Shared state type
type ServerState = Arc<Gateway>;

/// The body is taken raw so malformed JSON still gets a JSON error body.
async fn dispatch(gateway: ServerState, kind: EntityKind, op: Operation, body: Bytes) -> Response {
    tokio::task::spawn_blocking(move || gateway.handle(kind, op, &body))
        .await
        .unwrap_or_else(|e| ApiError::Internal(format!("Handler task failed: {}", e)).into_response())
}
