//! HTTP API tests against the router

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use focus_lock::{
    api::create_router,
    services::{MemoryStore, PreferenceStore},
    session::guard::DEFAULT_MONITOR_INTERVAL,
    state::AppState,
};

fn app() -> Router {
    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        store,
        20554,
        "127.0.0.1".to_string(),
        DEFAULT_MONITOR_INTERVAL,
    ));
    create_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn add_task(app: &Router, title: &str) -> u64 {
    let (status, task) = send(app, "POST", "/tasks", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    task["id"].as_u64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_start_and_double_start() {
    let app = app();
    let id = add_task(&app, "Write the report").await;

    let (status, body) = send(&app, "POST", "/session/start", Some(json!({ "task_id": id }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timer"]["phase"], "working");
    assert_eq!(body["timer"]["title"], "Write the report");
    assert_eq!(body["timer"]["display"], "03:00:00");

    let (status, body) = send(&app, "POST", "/session/start", Some(json!({ "task_id": id }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let app = app();
    let (status, _) = send(&app, "POST", "/session/start", Some(json!({ "task_id": 7 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duration_validation() {
    let app = app();
    let too_long = json!({
        "work_minutes": 200,
        "short_break_minutes": 5,
        "long_break_minutes": 15,
        "sessions_before_long_break": 4
    });
    let (status, body) = send(&app, "PUT", "/settings/durations", Some(too_long)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "work_minutes");

    let valid = json!({
        "work_minutes": 25,
        "short_break_minutes": 5,
        "long_break_minutes": 15,
        "sessions_before_long_break": 4
    });
    let (status, _) = send(&app, "PUT", "/settings/durations", Some(valid.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/settings/durations", None).await;
    assert_eq!(body, valid);
}

#[tokio::test]
async fn test_edit_flow() {
    let app = app();
    let id = add_task(&app, "Edit me").await;

    let (_, body) = send(&app, "POST", "/session/edit/commit", Some(json!({ "text": "10" }))).await;
    assert_eq!(body["status"], "ignored");

    send(&app, "POST", "/session/start", Some(json!({ "task_id": id }))).await;
    let (_, body) = send(&app, "POST", "/session/edit", None).await;
    assert_eq!(body["timer"]["is_editing"], true);

    let (status, body) =
        send(&app, "POST", "/session/edit/commit", Some(json!({ "text": "00:00:61" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["reason"], "⚠ Seconds: 0-59");

    let (status, body) =
        send(&app, "POST", "/session/edit/commit", Some(json!({ "text": "00:25:00" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["remaining_seconds"], 1500);
    assert_eq!(body["timer"]["is_editing"], false);
}

#[tokio::test]
async fn test_lock_blocks_stop() {
    let app = app();
    let id = add_task(&app, "Locked in").await;
    send(&app, "POST", "/session/start", Some(json!({ "task_id": id }))).await;
    send(&app, "POST", "/session/lock", Some(json!({ "locked": true }))).await;

    let (_, body) = send(&app, "POST", "/session/stop", None).await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["timer"]["phase"], "working");

    let (_, status) = send(&app, "GET", "/status", None).await;
    assert_eq!(status["blocking"]["lock_engaged"], true);
    assert_eq!(status["last_action"], "lock");
}

#[tokio::test]
async fn test_key_verdicts_follow_session() {
    let app = app();
    let ctrl_s = json!({ "key": "s", "ctrl": true, "target": { "ancestry": [".todo-item"] } });

    let (_, body) = send(&app, "POST", "/input/keydown", Some(ctrl_s.clone())).await;
    assert_eq!(body["prevent_default"], false);

    let id = add_task(&app, "Guarded").await;
    send(&app, "POST", "/session/start", Some(json!({ "task_id": id }))).await;

    let (_, body) = send(&app, "POST", "/input/keydown", Some(ctrl_s)).await;
    assert_eq!(body["prevent_default"], true);
    assert_eq!(body["verdict"], "prevent");

    let space = json!({ "key": " ", "target": { "ancestry": [".pause-icon", ".timer-controls"] } });
    let (_, body) = send(&app, "POST", "/input/keydown", Some(space)).await;
    assert_eq!(body["verdict"], "allow");
    assert_eq!(body["action"], "toggle_pause");

    let pointer = json!({ "action": "context_menu", "target": { "ancestry": [".todo-item"] } });
    let (_, body) = send(&app, "POST", "/input/pointer", Some(pointer)).await;
    assert_eq!(body["prevent_default"], true);
}

#[tokio::test]
async fn test_empty_task_title_rejected() {
    let app = app();
    let (status, body) = send(&app, "POST", "/tasks", Some(json!({ "title": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "title");

    let (_, tasks) = send(&app, "GET", "/tasks", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn test_reset_restores_defaults_when_idle() {
    let app = app();
    add_task(&app, "Forgotten").await;
    send(&app, "POST", "/session/lock", Some(json!({ "locked": true }))).await;

    let (_, body) = send(&app, "POST", "/settings/reset", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timer"]["is_locked"], false);

    let (_, tasks) = send(&app, "GET", "/tasks", None).await;
    assert_eq!(tasks, json!([]));
    let (_, durations) = send(&app, "GET", "/settings/durations", None).await;
    assert_eq!(durations["work_minutes"], 180);
}
