//! Focus session core
//!
//! Deterministic components driven by explicit instants: the countdown clock,
//! the duration policy, the distraction guard and the orchestrator that ties
//! them together.

pub mod clock;
pub mod events;
pub mod focus;
pub mod guard;
pub mod orchestrator;
pub mod policy;

// Re-export commonly used types
pub use clock::{FrameReport, SessionClock};
pub use events::{Effect, SessionEvent};
pub use guard::{
    DistractionGuard, EventTarget, FullscreenChange, KeyEvent, PointerAction, PointerEvent,
    Verdict, Viewport, ViewportCapabilities,
};
pub use orchestrator::{Collaborators, KeyOutcome, Orchestrator, ShortcutAction};
pub use policy::{DurationConfig, DurationInput, DurationPolicy};
