//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers, request bodies and response
//! structures.

pub mod handlers;
pub mod requests;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session/start", post(start_handler))
        .route("/session/pause", post(pause_handler))
        .route("/session/resume", post(resume_handler))
        .route("/session/stop", post(stop_handler))
        .route("/session/edit", post(edit_handler))
        .route("/session/edit/commit", post(edit_commit_handler))
        .route("/session/lock", post(lock_handler))
        .route(
            "/settings/durations",
            get(get_durations_handler).put(put_durations_handler),
        )
        .route("/settings/music", post(music_handler))
        .route("/settings/reset", post(reset_handler))
        .route("/input/keydown", post(key_down_handler))
        .route("/input/keyup", post(key_up_handler))
        .route("/input/pointer", post(pointer_handler))
        .route("/input/pointer-move", post(pointer_move_handler))
        .route("/viewport", post(viewport_handler))
        .route("/viewport/fullscreen", post(fullscreen_handler))
        .route("/tasks", get(list_tasks_handler).post(add_task_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
