//! # REST API Errors
//!
//! Every failure is caught at the handler boundary and answered with
//! `{"error": msg}` and the status below.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Body is not parseable JSON
    #[error("Malformed JSON body: {0}")]
    MalformedJson(String),

    /// Payload rejected by the entity schema
    #[error("{0}")]
    Validation(#[from] SchemaError),

    /// No document matched the identifier; carries the entity label
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A document with the client-supplied identifier already exists
    #[error("Duplicate identifier: '{0}' already exists")]
    DuplicateId(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("{0}")]
    Store(StoreError),

    /// Handler task did not run to completion
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateId(_) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { id, .. } => ApiError::DuplicateId(id),
            other => ApiError::Store(other),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedJson(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
