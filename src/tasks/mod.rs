//! Background tasks module
//!
//! Drivers that feed the current instant into the session orchestrator. They
//! own the scheduling; the orchestrator owns the meaning.

pub mod frame_driver;
pub mod guard_monitor;

// Re-export main functions
pub use frame_driver::frame_driver_task;
pub use guard_monitor::{guard_monitor_task, GUARD_RESOLUTION};
