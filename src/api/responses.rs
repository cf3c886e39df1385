//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    error::{SessionError, ValidationError},
    session::{DurationInput, FullscreenChange, KeyOutcome, ShortcutAction, Verdict},
    state::{BlockingState, TimerSnapshot},
};

/// API response structure for session commands
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// `ok` when the command changed the session, `ignored` otherwise
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn ok(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ok", message, timer)
    }

    pub fn ignored(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ignored", message, timer)
    }
}

/// Full status response
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub blocking: BlockingState,
    pub durations: DurationInput,
    pub music_enabled: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Answer to a forwarded key or pointer event
#[derive(Debug, Clone, Serialize)]
pub struct VerdictResponse {
    pub prevent_default: bool,
    pub verdict: Verdict,
    pub action: Option<ShortcutAction>,
}

impl From<Verdict> for VerdictResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            prevent_default: verdict.prevents_default(),
            verdict,
            action: None,
        }
    }
}

impl From<KeyOutcome> for VerdictResponse {
    fn from(outcome: KeyOutcome) -> Self {
        Self {
            prevent_default: outcome.prevents_default(),
            verdict: outcome.verdict,
            action: outcome.action,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FullscreenResponse {
    pub change: FullscreenChange,
    pub timer: TimerSnapshot,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body for anything other than a validation failure
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler failures mapped onto HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    /// 422 with the `{field, reason}` body
    Validation(ValidationError),
    NotFound(String),
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(e) => ApiError::Validation(e),
            SessionError::UnknownTask(task) => ApiError::NotFound(format!("unknown task: {}", task)),
            SessionError::InvalidState(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, Json(e)).into_response(),
            ApiError::NotFound(error) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error })).into_response()
            }
            ApiError::Internal(error) => {
                error!("Internal error: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
            }
        }
    }
}
