//! State management module
//!
//! This module contains the session data model and the shared application state.

pub mod app_state;
pub mod blocking_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use blocking_state::BlockingState;
pub use timer_state::{format_clock, SessionPhase, TaskId, TimerSnapshot, TimerState};
