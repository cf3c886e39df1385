//! Timer state structure and session phases

use serde::{Deserialize, Serialize};

/// Identifier of a task in the task list
pub type TaskId = u64;

/// One segment of the Pomodoro cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Working,
    ShortBreak,
    LongBreak,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Working => "working",
            SessionPhase::ShortBreak => "short_break",
            SessionPhase::LongBreak => "long_break",
        }
    }

    /// Check if this phase is a break of either length
    pub fn is_break(&self) -> bool {
        matches!(self, SessionPhase::ShortBreak | SessionPhase::LongBreak)
    }

    /// Check if a session is in progress
    pub fn is_active(&self) -> bool {
        *self != SessionPhase::Idle
    }

    /// Title shown on the timer overlay for break phases
    pub fn break_title(&self) -> Option<&'static str> {
        match self {
            SessionPhase::ShortBreak => Some("Break"),
            SessionPhase::LongBreak => Some("Long Break"),
            _ => None,
        }
    }
}

/// Mutable timer state owned by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimerState {
    pub phase: SessionPhase,
    pub remaining_seconds: u64,
    pub is_paused: bool,
    pub is_editing: bool,
    pub is_locked: bool,
    /// Task bound to the current working phase
    pub active_task: Option<TaskId>,
}

impl TimerState {
    /// Create an idle timer state
    pub fn new(is_locked: bool) -> Self {
        Self {
            is_locked,
            ..Self::default()
        }
    }

    /// Whether the countdown should advance
    pub fn is_running(&self) -> bool {
        self.phase.is_active() && !self.is_paused && !self.is_editing
    }

    /// Return to idle, keeping only the lock preference
    pub fn reset(&mut self) {
        *self = Self::new(self.is_locked);
    }
}

/// Serializable view of the timer for clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub state: TimerState,
    pub title: Option<String>,
    pub display: String,
    pub completed_sessions: u32,
    pub cursor_hidden: bool,
    pub edit_error: Option<String>,
}

/// Format seconds as `HH:MM:SS`
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
