//! API request bodies

use serde::Deserialize;

use crate::{session::ViewportCapabilities, state::TaskId};

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub task_id: TaskId,
}

#[derive(Debug, Deserialize)]
pub struct EditCommitRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

#[derive(Debug, Deserialize)]
pub struct MusicRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Platform capabilities reported once the front-end loads
#[derive(Debug, Deserialize)]
pub struct ViewportRequest {
    #[serde(default)]
    pub fullscreen_supported: bool,
    #[serde(default)]
    pub orientation_lock_supported: bool,
}

impl From<ViewportRequest> for ViewportCapabilities {
    fn from(request: ViewportRequest) -> Self {
        Self {
            fullscreen: request.fullscreen_supported,
            orientation_lock: request.orientation_lock_supported,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FullscreenRequest {
    pub fullscreen: bool,
}
