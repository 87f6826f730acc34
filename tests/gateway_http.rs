//! Gateway HTTP Tests
//!
//! Drives the full router (entity routes, health, CORS, body limit) with
//! in-process requests against an in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docgate::http_server::{HttpServer, HttpServerConfig};
use docgate::store::{DocumentStore, InMemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn app() -> Router {
    app_with(HttpServerConfig::default())
}

fn app_with(config: HttpServerConfig) -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    HttpServer::with_config(config, store).router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn post_raw(app: &Router, path: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, &body.to_string()).await
}

async fn create(app: &Router, prefix: &str, body: Value) -> String {
    let (status, response) = post(app, &format!("/{}/new", prefix), body).await;
    assert_eq!(status, StatusCode::OK, "{}", response);
    assert_eq!(response["success"], true);
    response["inserted_id"].as_str().unwrap().to_string()
}

fn event(title: &str, person: &str, start: &str, end: &str, location: &str) -> Value {
    json!({
        "title": title,
        "participants": 2,
        "location": location,
        "start": start,
        "end": end,
        "person": person
    })
}

fn titles(list: &Value) -> Vec<String> {
    let mut titles: Vec<String> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    titles
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[tokio::test]
async fn test_game_config_create_then_list() {
    let app = app();
    let payload = json!({
        "configName": "default",
        "rufspielTarif": 20,
        "soloTarif": 40,
        "bonusTarif": 10,
        "alleWeiter": "yes",
        "soloArten": ["wenz"],
        "hochzeit": true,
        "klopfen": false,
        "ramschTarif": 20
    });

    let id = create(&app, "vgameConfig", payload.clone()).await;
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    let (status, list) = post_raw(&app, "/vgameConfig/get", "").await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = payload;
    expected["_id"] = json!(id);
    assert_eq!(list, json!([expected]));
}

#[tokio::test]
async fn test_event_round_trip_normalizes_timestamps_and_defaults() {
    let app = app();
    let id = create(
        &app,
        "vevent",
        json!({
            "title": "Dinner",
            "participants": 4,
            "start": "2024-05-01T19:00:00Z",
            "end": "2024-05-01 21:30",
            "person": "alice",
            "shoeSize": 42
        }),
    )
    .await;

    let (status, list) = post(
        &app,
        "/vevent/get",
        json!({"start": "2024-05-01", "end": "2024-05-02", "persons": ["alice"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        list,
        json!([{
            "_id": id,
            "title": "Dinner",
            "description": "",
            "participants": 4,
            "location": "",
            "start": "2024-05-01T19:00:00.000Z",
            "end": "2024-05-01T21:30:00.000Z",
            "person": "alice"
        }])
    );
}

#[tokio::test]
async fn test_client_supplied_id_is_kept_and_unique() {
    let app = app();
    let note = json!({
        "_id": "note-1",
        "title": "Groceries",
        "created_at": "01.05.2024",
        "last_edited": "01.05.2024",
        "person": "alice",
        "creator": "alice"
    });

    assert_eq!(create(&app, "vnote", note.clone()).await, "note-1");

    let (status, body) = post(&app, "/vnote/new", note).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("note-1"));
}

// =============================================================================
// Event Overlap Tests
// =============================================================================

#[tokio::test]
async fn test_event_overlap_query() {
    let app = app();
    create(&app, "vevent", event("overlaps", "alice", "2024-05-01T10:00:00Z", "2024-05-01T12:00:00Z", "Home")).await;
    create(&app, "vevent", event("ends-at-start", "alice", "2024-05-01T08:00:00Z", "2024-05-01T09:00:00Z", "Home")).await;
    create(&app, "vevent", event("starts-at-end", "alice", "2024-05-01T14:00:00Z", "2024-05-01T15:00:00Z", "Home")).await;
    create(&app, "vevent", event("at-salettl", "bob", "2024-05-01T11:00:00Z", "2024-05-01T13:00:00Z", "Salettl")).await;
    create(&app, "vevent", event("other-person", "carol", "2024-05-01T10:00:00Z", "2024-05-01T11:00:00Z", "Salettl")).await;

    let query = json!({
        "start": "2024-05-01T09:00:00Z",
        "end": "2024-05-01T14:00:00Z",
        "persons": ["alice", "bob"]
    });
    let (status, list) = post(&app, "/vevent/get", query.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), vec!["at-salettl", "overlaps"]);

    let mut flagged = query;
    flagged["isSalettl"] = json!(true);
    let (_, list) = post(&app, "/vevent/get", flagged).await;
    assert_eq!(titles(&list), vec!["at-salettl"]);
}

#[tokio::test]
async fn test_event_flag_accepts_truthy_values() {
    let app = app();
    create(&app, "vevent", event("home", "alice", "2024-05-01T10:00:00Z", "2024-05-01T12:00:00Z", "Home")).await;
    create(&app, "vevent", event("pub", "alice", "2024-05-01T10:00:00Z", "2024-05-01T12:00:00Z", "Salettl")).await;

    for (flag, expected) in [
        (json!("true"), vec!["pub"]),
        (json!(1), vec!["pub"]),
        (json!(0), vec!["home", "pub"]),
        (json!(""), vec!["home", "pub"]),
    ] {
        let query = json!({
            "start": "2024-05-01",
            "end": "2024-05-02",
            "persons": ["alice"],
            "isSalettl": flag.clone()
        });
        let (status, list) = post(&app, "/vevent/get", query).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&list), expected, "{}", flag);
    }
}

#[tokio::test]
async fn test_event_accepts_iso_offset_and_basic_forms() {
    let app = app();
    let id = create(
        &app,
        "vevent",
        event("Standup", "alice", "2024-05-01T12:00:00+0200", "20240501T110000Z", ""),
    )
    .await;

    let (status, list) = post(
        &app,
        "/vevent/get",
        json!({"start": "2024-05-01T09+00", "end": "2024-05-01T12:30:00+02", "persons": ["alice"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["_id"], json!(id));
    assert_eq!(list[0]["start"], "2024-05-01T10:00:00.000Z");
    assert_eq!(list[0]["end"], "2024-05-01T11:00:00.000Z");
}

#[tokio::test]
async fn test_event_query_with_missing_fields_is_rejected() {
    let app = app();
    let (status, body) = post(&app, "/vevent/get", json!({"persons": ["alice"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_event_without_participants_writes_nothing() {
    let app = app();
    let mut payload = event("Dinner", "alice", "2024-05-01T19:00:00Z", "2024-05-01T21:00:00Z", "");
    payload.as_object_mut().unwrap().remove("participants");

    let (status, body) = post(&app, "/vevent/new", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("participants"));

    let (_, list) = post(
        &app,
        "/vevent/get",
        json!({"start": "2024-01-01", "end": "2025-01-01", "persons": ["alice"]}),
    )
    .await;
    assert_eq!(list, json!([]));
}

// =============================================================================
// Update / Delete Tests
// =============================================================================

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    let app = app();
    let id = create(
        &app,
        "vtodolist",
        json!({
            "creator": "alice",
            "person": "bob",
            "title": "Weekend",
            "list": [{"context": "laundry", "active": true}],
            "created_at": "2024-05-01T08:00:00Z",
            "last_edited": "2024-05-01T08:00:00Z"
        }),
    )
    .await;

    let (status, body) = post(
        &app,
        "/vtodolist/edit",
        json!({"_id": id, "title": "Long weekend", "last_edited": "2024-05-02T09:15:00Z"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "updated_id": id}));

    let (_, list) = post(&app, "/vtodolist/get", json!({"person": "bob"})).await;
    assert_eq!(
        list,
        json!([{
            "_id": id,
            "creator": "alice",
            "person": "bob",
            "title": "Long weekend",
            "list": [{"active": true, "context": "laundry"}],
            "created_at": "2024-05-01T08:00:00.000Z",
            "last_edited": "2024-05-02T09:15:00.000Z"
        }])
    );
}

#[tokio::test]
async fn test_note_edit_is_available() {
    let app = app();
    let id = create(
        &app,
        "vnote",
        json!({
            "title": "Draft",
            "created_at": "2024-05-01",
            "last_edited": "2024-05-01",
            "person": "alice",
            "creator": "alice"
        }),
    )
    .await;

    let (status, _) = post(&app, "/vnote/edit", json!({"_id": id, "content": "hello"})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = post(&app, "/vnote/get", json!({"person": "alice"})).await;
    assert_eq!(list[0]["content"], "hello");
    assert_eq!(list[0]["title"], "Draft");
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = app();
    let (status, body) = post(&app, "/vrecommendation/edit", json!({"_id": "missing", "title": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Recommendation not found"}));
}

#[tokio::test]
async fn test_delete_twice() {
    let app = app();
    let id = create(
        &app,
        "vrecipe",
        json!({
            "title": "Pancakes",
            "owner": "alice",
            "ingredients": [{"name": "flour", "amount": 200, "unit": "g"}],
            "guide": "Mix and fry.",
            "persons": 2
        }),
    )
    .await;

    let (status, body) = post(&app, "/vrecipe/delete", json!({"_id": id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "deleted_id": id}));

    let (status, body) = post(&app, "/vrecipe/delete", json!({"_id": id})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Recipe not found"}));
}

// =============================================================================
// Recommendation Facet Tests
// =============================================================================

#[tokio::test]
async fn test_recommendation_type_filter() {
    let app = app();
    for (title, kind) in [("Pasta place", "food"), ("Dune", "book"), ("Ramen bar", "food")] {
        create(
            &app,
            "vrecommendation",
            json!({"title": title, "creator": "alice", "description": "", "type": kind}),
        )
        .await;
    }

    let (_, list) = post(&app, "/vrecommendation/get", json!({"type": "food"})).await;
    assert_eq!(titles(&list), vec!["Pasta place", "Ramen bar"]);

    let (_, list) = post(&app, "/vrecommendation/get", json!({"type": ""})).await;
    assert_eq!(list.as_array().unwrap().len(), 3);

    let (_, list) = post(&app, "/vrecommendation/get", json!({})).await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

// =============================================================================
// Transport Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_json_gets_json_error() {
    let app = app();
    let (status, body) = post_raw(&app, "/vnote/new", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Malformed JSON body"));
}

#[tokio::test]
async fn test_empty_list_is_success() {
    let app = app();
    let (status, body) = post(&app, "/vnote/get", json!({"person": "nobody"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_health_route() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app();
    let (status, _) = post(&app, "/vunknown/get", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/vrecipe/get")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_echoes_only_configured_origins() {
    let app = app_with(HttpServerConfig {
        cors_origins: vec!["http://planner.test".to_string()],
        ..Default::default()
    });

    for (origin, allowed) in [("http://planner.test", true), ("http://other.test", false)] {
        let request = Request::builder()
            .method("POST")
            .uri("/vrecipe/get")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let allow = response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN);
        if allowed {
            assert_eq!(allow.unwrap(), origin);
        } else {
            assert!(allow.is_none(), "{}", origin);
        }
    }
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let app = app_with(HttpServerConfig {
        max_body_bytes: 64,
        ..Default::default()
    });
    let body = json!({"person": "x".repeat(128)}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/vnote/get")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
