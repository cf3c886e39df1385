//! Events published to the front-end

use serde::{Deserialize, Serialize};

use crate::state::{SessionPhase, TaskId};

/// Effect requests the front-end must carry out on its platform APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    EnterFullscreen,
    ExitFullscreen,
    LockOrientation,
    UnlockOrientation,
    PlayAudio { reset: bool },
    PauseAudio,
    StopAudio,
    SuppressNotifications { active: bool },
    HideCursor { hidden: bool },
}

/// Everything the UI needs to re-render the timer overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PhaseChanged {
        phase: SessionPhase,
        remaining_seconds: u64,
        title: Option<String>,
    },
    Tick {
        remaining_seconds: u64,
    },
    PauseChanged {
        paused: bool,
    },
    EditStarted {
        remaining_seconds: u64,
    },
    EditCommitted {
        remaining_seconds: u64,
    },
    EditError {
        message: String,
    },
    EditErrorCleared,
    LockChanged {
        locked: bool,
    },
    MusicChanged {
        enabled: bool,
    },
    TaskCompleted {
        task: TaskId,
        completed_sessions: u32,
    },
    Effect(Effect),
}
