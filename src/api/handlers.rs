//! HTTP endpoint handlers
//!
//! Each handler takes the session lock once, runs one orchestrator command and
//! answers with the resulting timer snapshot.

use std::{convert::Infallible, sync::Arc, time::Instant};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    error::ValidationError,
    services::Task,
    session::{DurationInput, KeyEvent, Orchestrator, PointerEvent},
    state::AppState,
};
use super::{
    requests::{
        EditCommitRequest, FullscreenRequest, LockRequest, MusicRequest, NewTaskRequest,
        StartRequest, ViewportRequest,
    },
    responses::{
        ApiError, ApiResponse, FullscreenResponse, HealthResponse, StatusResponse, VerdictResponse,
    },
};

/// Build the command response, recording the action when it took effect
fn command_response(
    state: &AppState,
    session: &Orchestrator,
    action: &str,
    applied: bool,
) -> Json<ApiResponse> {
    let timer = session.snapshot();
    if applied {
        state.record_action(action);
        Json(ApiResponse::ok(format!("{} applied", action), timer))
    } else {
        Json(ApiResponse::ignored(
            format!("{} ignored in the current state", action),
            timer,
        ))
    }
}

/// Handle POST /session/start - Start a work phase on a task
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut session = state.session();
    let started = session.start(Instant::now(), request.task_id)?;
    Ok(command_response(&state, &session, "start", started))
}

/// Handle POST /session/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let mut session = state.session();
    let paused = session.pause();
    command_response(&state, &session, "pause", paused)
}

/// Handle POST /session/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let mut session = state.session();
    let resumed = session.resume(Instant::now());
    command_response(&state, &session, "resume", resumed)
}

/// Handle POST /session/stop - Abandon the session and return to idle
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let mut session = state.session();
    let stopped = session.stop();
    command_response(&state, &session, "stop", stopped)
}

/// Handle POST /session/edit - Enter timer edit mode
pub async fn edit_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let mut session = state.session();
    let editing = session.begin_edit();
    command_response(&state, &session, "edit", editing)
}

/// Handle POST /session/edit/commit - Apply the edited timer text
pub async fn edit_commit_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EditCommitRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut session = state.session();
    let committed = session.commit_edit(Instant::now(), &request.text)?;
    Ok(command_response(&state, &session, "edit-commit", committed))
}

/// Handle POST /session/lock
pub async fn lock_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LockRequest>,
) -> Json<ApiResponse> {
    let mut session = state.session();
    session.set_locked(request.locked);
    let action = if request.locked { "lock" } else { "unlock" };
    command_response(&state, &session, action, true)
}

/// Handle GET /settings/durations
pub async fn get_durations_handler(State(state): State<Arc<AppState>>) -> Json<DurationInput> {
    Json(state.session().durations().as_input())
}

/// Handle PUT /settings/durations - Validate and save durations in minutes
pub async fn put_durations_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationInput>,
) -> Result<Json<DurationInput>, ApiError> {
    let config = state.session().set_durations(request)?;
    state.record_action("durations");
    Ok(Json(config.as_input()))
}

/// Handle POST /settings/music
pub async fn music_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MusicRequest>,
) -> Json<ApiResponse> {
    let mut session = state.session();
    session.set_music_enabled(request.enabled);
    let action = if request.enabled { "music-on" } else { "music-off" };
    command_response(&state, &session, action, true)
}

/// Handle POST /settings/reset - Clear stored preferences while idle
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let mut session = state.session();
    let reset = session.reset();
    if reset {
        // the store no longer holds the list; reload what it has now
        state.tasks.lock().reload();
    }
    command_response(&state, &session, "reset", reset)
}

/// Handle POST /input/keydown
pub async fn key_down_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<KeyEvent>,
) -> Json<VerdictResponse> {
    let outcome = state.session().handle_key_down(Instant::now(), &event);
    Json(outcome.into())
}

/// Handle POST /input/keyup
pub async fn key_up_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<KeyEvent>,
) -> Json<VerdictResponse> {
    Json(state.session().handle_key_up(&event).into())
}

/// Handle POST /input/pointer - Context menu, drag and selection attempts
pub async fn pointer_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<PointerEvent>,
) -> Json<VerdictResponse> {
    Json(state.session().handle_pointer(&event).into())
}

/// Handle POST /input/pointer-move
pub async fn pointer_move_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session().pointer_moved(Instant::now());
    StatusCode::NO_CONTENT
}

/// Handle POST /viewport - Capabilities reported by the front-end
pub async fn viewport_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewportRequest>,
) -> StatusCode {
    state.session().set_viewport_capabilities(request.into());
    StatusCode::NO_CONTENT
}

/// Handle POST /viewport/fullscreen - Fullscreen-change report
pub async fn fullscreen_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FullscreenRequest>,
) -> Json<FullscreenResponse> {
    let mut session = state.session();
    let change = session.fullscreen_changed(Instant::now(), request.fullscreen);
    Json(FullscreenResponse {
        change,
        timer: session.snapshot(),
    })
}

/// Handle GET /tasks
pub async fn list_tasks_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.tasks.lock().tasks().to_vec())
}

/// Handle POST /tasks - Append a task to the list
pub async fn add_task_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ValidationError::new("title", "Task title cannot be empty").into());
    }
    let task = state.tasks.lock().add(&request.title, request.completed);
    info!("Task {} added: {}", task.id, task.title);
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handle GET /status - Return current session status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let session = state.session();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: session.snapshot(),
        blocking: session.blocking(),
        durations: session.durations().as_input(),
        music_enabled: session.music_enabled(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Session events as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    info!("Event subscriber connected");

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse_event) => return Some((Ok::<_, Infallible>(sse_event), rx)),
                    Err(e) => warn!("Failed to encode session event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
