//! Integration tests for the agent HTTP surface.
//!
//! Grounded on `emergence-observer`'s `tests/api_tests.rs`: drive the Axum
//! `Router` directly via `tower::ServiceExt::oneshot`, no live TCP socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use clawcity_dispatcher::context::DispatchContext;
use clawcity_server::build_router;
use clawcity_server::state::AppState;
use clawcity_world::{WorldConfig, WorldStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    let store = WorldStore::seeded(WorldConfig::default(), 1);
    let ctx = DispatchContext::new(store);
    let state = Arc::new(AppState { ctx });
    build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public_and_ok() {
    let response = app().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn guide_is_public() {
    let response = app().oneshot(Request::get("/agent/guide").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn state_without_bearer_token_is_rejected() {
    let response = app().oneshot(Request::get("/agent/state").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn register(app: &axum::Router) -> (String, String) {
    let request = Request::post("/agent/register")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "Alice" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    (body["agentId"].as_str().unwrap().to_string(), body["apiKey"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn register_then_read_state() {
    let app = app();
    let (agent_id, api_key) = register(&app).await;

    let request = Request::get("/agent/state").header("authorization", format!("Bearer {api_key}")).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["agent"]["id"], agent_id);
    assert_eq!(body["agent"]["location_zone_id"], "residential");
}

#[tokio::test]
async fn act_without_request_id_is_bad_request() {
    let app = app();
    let (_, api_key) = register(&app).await;

    let request = Request::post("/agent/act")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {api_key}"))
        .body(Body::from(json!({ "action": "REST", "args": {} }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn act_with_unknown_action_is_bad_request() {
    let app = app();
    let (_, api_key) = register(&app).await;

    let request = Request::post("/agent/act")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {api_key}"))
        .body(Body::from(json!({ "requestId": "r1", "action": "FLY", "args": {} }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rest_action_busies_the_agent_and_replay_is_idempotent() {
    let app = app();
    let (_, api_key) = register(&app).await;
    let auth = format!("Bearer {api_key}");

    let act_once = || {
        Request::post("/agent/act")
            .header("content-type", "application/json")
            .header("authorization", auth.clone())
            .body(Body::from(json!({ "requestId": "r1", "action": "REST", "args": {} }).to_string()))
            .unwrap()
    };

    let first = app.clone().oneshot(act_once()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = body_json(first).await;
    assert!(first_body["ok"].as_bool().unwrap());

    let second = app.oneshot(act_once()).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = body_json(second).await;
    assert_eq!(first_body["data"], second_body["data"]);
}

#[tokio::test]
async fn move_to_unknown_zone_is_unprocessable() {
    let app = app();
    let (_, api_key) = register(&app).await;

    let request = Request::post("/agent/act")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {api_key}"))
        .body(Body::from(json!({ "requestId": "r1", "action": "MOVE", "args": { "to_zone": "nowhere" } }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
