//! Focus Lock - Pomodoro focus sessions with distraction blocking
//!
//! The session core (clock, duration policy, distraction guard and the
//! orchestrator) is deterministic and driven by explicit instants. The service
//! around it exposes the orchestrator to a browser front-end over HTTP and
//! server-sent events.

pub mod config;
pub mod error;
pub mod state;
pub mod session;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{CapabilityUnavailable, InvalidStateError, SessionError, ValidationError};
pub use state::AppState;
pub use session::Orchestrator;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
