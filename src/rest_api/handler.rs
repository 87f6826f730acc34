//! # Gateway Handler
//!
//! One generic handler serves every entity kind. The entity's schema and list
//! scope come from the registry; the store is injected.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::observability::{Event, Logger, RequestPhase, RequestScope, Severity};
use crate::query::QueryBuilder;
use crate::schema::EntityKind;
use crate::store::DocumentStore;

use super::errors::{ApiError, ApiResult};
use super::response::{DeleteResponse, InsertResponse, UpdateResponse};

/// Operations exposed for each entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::List,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    /// Trailing path segment of the operation's route
    pub fn path_segment(&self) -> &'static str {
        match self {
            Operation::List => "get",
            Operation::Create => "new",
            Operation::Update => "edit",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Generic request handler over an injected document store
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn DocumentStore>,
}

impl Gateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Runs one operation and renders its response, logging the outcome.
    pub fn handle(&self, kind: EntityKind, op: Operation, body: &[u8]) -> Response {
        let mut scope = RequestScope::begin(format!("{}/{}", kind.route_prefix(), op.path_segment()));

        let result = match op {
            Operation::List => self
                .list(kind, body, &mut scope)
                .map(|docs| {
                    let count = docs.len().to_string();
                    (Json(Value::Array(docs)).into_response(), Some(count))
                }),
            Operation::Create => self
                .create(kind, body, &mut scope)
                .map(|resp| (Json(resp).into_response(), None)),
            Operation::Update => self
                .update(kind, body, &mut scope)
                .map(|resp| (Json(resp).into_response(), None)),
            Operation::Delete => self
                .delete(kind, body, &mut scope)
                .map(|resp| (Json(resp).into_response(), None)),
        };

        match result {
            Ok((response, count)) => {
                let status = StatusCode::OK.as_u16().to_string();
                match count {
                    Some(count) => scope.complete(&[("count", count.as_str()), ("status", status.as_str())]),
                    None => scope.complete(&[("status", status.as_str())]),
                }
                response
            }
            Err(err) => {
                scope.fail(err.status_code().as_u16(), &err.to_string());
                err.into_response()
            }
        }
    }

    /// Lists documents of `kind` selected by the entity's list scope.
    pub fn list(&self, kind: EntityKind, body: &[u8], scope: &mut RequestScope) -> ApiResult<Vec<Value>> {
        let builder = QueryBuilder::new(kind);

        let filter = if kind.list_scope().needs_body() {
            let payload = parse_body(body)?;
            builder.list(Some(&payload))?
        } else {
            builder.list(None)?
        };
        scope.advance(RequestPhase::Validated);

        if Logger::enabled(Severity::Trace) {
            let rendered = filter.to_query_json().to_string();
            Logger::trace(
                Event::QueryBuilt.as_str(),
                &[
                    ("collection", kind.collection()),
                    ("filter", rendered.as_str()),
                    ("request_id", scope.request_id()),
                ],
            );
        }

        let documents = self.store.find(kind.collection(), &filter)?;
        scope.advance(RequestPhase::Executed);

        Ok(documents.iter().map(|doc| doc.to_json()).collect())
    }

    /// Validates and inserts one document.
    pub fn create(&self, kind: EntityKind, body: &[u8], scope: &mut RequestScope) -> ApiResult<InsertResponse> {
        let payload = parse_body(body)?;
        let insert = QueryBuilder::new(kind).insert(&payload)?;
        scope.advance(RequestPhase::Validated);

        let inserted_id = self.store.insert_one(kind.collection(), insert.document)?;
        scope.advance(RequestPhase::Executed);

        Ok(InsertResponse::new(inserted_id))
    }

    /// Merges the supplied fields into the document named by `_id`.
    pub fn update(&self, kind: EntityKind, body: &[u8], scope: &mut RequestScope) -> ApiResult<UpdateResponse> {
        let payload = parse_body(body)?;
        let update = QueryBuilder::new(kind).update(&payload)?;
        scope.advance(RequestPhase::Validated);

        let matched = self.store.update_one(kind.collection(), &update.filter, &update.set)?;
        scope.advance(RequestPhase::Executed);

        if matched == 0 {
            return Err(ApiError::NotFound(kind.label()));
        }
        Ok(UpdateResponse::new(update.id))
    }

    /// Removes the document named by `_id`.
    pub fn delete(&self, kind: EntityKind, body: &[u8], scope: &mut RequestScope) -> ApiResult<DeleteResponse> {
        let payload = parse_body(body)?;
        let delete = QueryBuilder::new(kind).delete(&payload)?;
        scope.advance(RequestPhase::Validated);

        let deleted = self.store.delete_one(kind.collection(), &delete.filter)?;
        scope.advance(RequestPhase::Executed);

        if deleted == 0 {
            return Err(ApiError::NotFound(kind.label()));
        }
        Ok(DeleteResponse::new(delete.id))
    }
}

/// Parses a request body as JSON.
///
/// An empty body is reported as malformed rather than as an empty object.
fn parse_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::MalformedJson("request body is empty".to_string()));
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(InMemoryStore::new()))
    }

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn scope() -> RequestScope {
        RequestScope::begin("test")
    }

    fn finish(scope: RequestScope) {
        scope.complete(&[]);
    }

    #[test]
    fn test_create_then_list_notes() {
        let gateway = gateway();
        let mut s = scope();
        let created = gateway
            .create(
                EntityKind::Note,
                &body(json!({
                    "title": "Shopping",
                    "created_at": "2024-05-01",
                    "last_edited": "2024-05-01",
                    "person": "alice",
                    "creator": "alice"
                })),
                &mut s,
            )
            .unwrap();
        assert_eq!(s.phase(), RequestPhase::Executed);
        finish(s);

        let mut s = scope();
        let listed = gateway
            .list(EntityKind::Note, &body(json!({"person": "alice"})), &mut s)
            .unwrap();
        finish(s);

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["_id"], json!(created.inserted_id));
        assert_eq!(listed[0]["content"], json!(""));
        assert_eq!(listed[0]["created_at"], json!("2024-05-01"));
    }

    #[test]
    fn test_validation_failure_stops_before_store() {
        let gateway = gateway();
        let mut s = scope();
        let err = gateway
            .create(EntityKind::Recipe, &body(json!({"title": "Soup"})), &mut s)
            .unwrap_err();
        assert_eq!(s.phase(), RequestPhase::Received);
        s.fail(400, "test");

        match err {
            ApiError::Validation(e) => assert_eq!(e.code(), SchemaErrorCode::MissingField),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(gateway.store().find("recipes", &crate::store::Filter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete_missing_are_not_found() {
        let gateway = gateway();

        let mut s = scope();
        let err = gateway
            .update(EntityKind::ToDoList, &body(json!({"_id": "nope", "title": "x"})), &mut s)
            .unwrap_err();
        assert_eq!(s.phase(), RequestPhase::Executed);
        assert_eq!(err.to_string(), "To-Do List not found");
        s.fail(404, "test");

        let mut s = scope();
        let err = gateway
            .delete(EntityKind::GameConfig, &body(json!({"_id": "nope"})), &mut s)
            .unwrap_err();
        assert_eq!(err.to_string(), "Game config not found");
        s.fail(404, "test");
    }

    #[test]
    fn test_list_ignores_body_for_unscoped_entities() {
        let gateway = gateway();
        let mut s = scope();
        assert!(gateway.list(EntityKind::Recipe, b"not json", &mut s).unwrap().is_empty());
        finish(s);

        let mut s = scope();
        let err = gateway.list(EntityKind::Event, b"not json", &mut s).unwrap_err();
        assert!(matches!(err, ApiError::MalformedJson(_)));
        s.fail(400, "test");
    }

    #[test]
    fn test_empty_body_is_malformed() {
        assert!(matches!(parse_body(b""), Err(ApiError::MalformedJson(_))));
        assert!(matches!(parse_body(b"  \n"), Err(ApiError::MalformedJson(_))));
        assert_eq!(parse_body(b"{}").unwrap(), json!({}));
    }

    #[test]
    fn test_handle_renders_error_status() {
        let gateway = gateway();
        let response = gateway.handle(EntityKind::Note, Operation::Delete, b"{}");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = gateway.handle(EntityKind::Recipe, Operation::List, b"");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_operation_segments() {
        let segments: Vec<_> = Operation::ALL.iter().map(|op| op.path_segment()).collect();
        assert_eq!(segments, vec!["get", "new", "edit", "delete"]);
    }
}
