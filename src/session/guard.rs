//! Distraction guard
//!
//! Decides which keyboard and mouse events the front-end must swallow while a
//! session is active, and keeps the viewport pinned in fullscreen. Input events
//! arrive as plain data; the guard answers with a verdict and never touches
//! orchestrator state. Fullscreen exits that were not caused by a blocked key are
//! reported back to the caller as [`FullscreenChange::GenuineExit`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::CapabilityUnavailable, state::BlockingState};

pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_millis(100);

/// Delay before re-checking fullscreen after a blocked F11
const BOUNCE_CHECK_DELAY: Duration = Duration::from_millis(10);
/// How long the blocked-exit flag outlives the bounce check
const BOUNCE_CLEAR_DELAY: Duration = Duration::from_millis(100);
/// Delay before silently re-entering after a bounced fullscreen change
const REENTER_DELAY: Duration = Duration::from_millis(50);

/// Fullscreen and orientation access; every call may be unsupported
pub trait Viewport: Send {
    fn is_fullscreen(&self) -> Result<bool, CapabilityUnavailable>;

    fn request_fullscreen(&mut self) -> Result<(), CapabilityUnavailable>;

    fn exit_fullscreen(&mut self) -> Result<(), CapabilityUnavailable>;

    fn lock_orientation(&mut self) -> Result<(), CapabilityUnavailable>;

    fn unlock_orientation(&mut self) -> Result<(), CapabilityUnavailable>;

    /// Record a fullscreen state reported by the display surface
    fn observe_fullscreen(&mut self, _fullscreen: bool) {}

    fn observe_capabilities(&mut self, _capabilities: ViewportCapabilities) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewportCapabilities {
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub orientation_lock: bool,
}

/// Timer controls that stay usable while the guard is engaged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSurface {
    TimerControls,
    EditTimerIcon,
    PauseIcon,
    StopIcon,
    TimerLockToggle,
    LockToggleIcon,
    TimerSoundToggle,
    SoundToggleIcon,
    TimerDisplay,
}

impl ControlSurface {
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector {
            ".timer-controls" => Some(Self::TimerControls),
            ".edit-timer-icon" => Some(Self::EditTimerIcon),
            ".pause-icon" => Some(Self::PauseIcon),
            ".stop-icon" => Some(Self::StopIcon),
            ".timer-lock-toggle" => Some(Self::TimerLockToggle),
            ".lock-toggle-icon" => Some(Self::LockToggleIcon),
            ".timer-sound-toggle" => Some(Self::TimerSoundToggle),
            ".sound-toggle-icon" => Some(Self::SoundToggleIcon),
            "#timer-display" => Some(Self::TimerDisplay),
            _ => None,
        }
    }
}

/// The element an event was dispatched to.
///
/// `ancestry[0]` describes the target itself, followed by its ancestors up to
/// the document. Each entry is a whitespace-separated list of `#id` and
/// `.class` selectors for that element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventTarget {
    #[serde(default)]
    pub ancestry: Vec<String>,
    /// Whether the target is currently content-editable
    #[serde(default)]
    pub editable: bool,
}

impl EventTarget {
    pub fn new<I, S>(ancestry: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ancestry: ancestry.into_iter().map(Into::into).collect(),
            editable: false,
        }
    }

    fn surfaces(entry: &str) -> impl Iterator<Item = ControlSurface> + '_ {
        entry.split_whitespace().filter_map(ControlSurface::from_selector)
    }

    /// Is, or is contained within, one of the timer's control buttons
    pub fn within_control(&self) -> bool {
        self.ancestry
            .iter()
            .flat_map(|entry| Self::surfaces(entry))
            .any(|surface| surface != ControlSurface::TimerDisplay)
    }

    pub fn is_timer_display(&self) -> bool {
        self.ancestry
            .first()
            .map(|entry| Self::surfaces(entry).any(|s| s == ControlSurface::TimerDisplay))
            .unwrap_or(false)
    }
}

/// A keyboard event forwarded by the front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub target: EventTarget,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            shift: false,
            alt: false,
            target: EventTarget::default(),
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn on(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    ContextMenu,
    DragStart,
    SelectStart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub action: PointerAction,
    #[serde(default)]
    pub target: EventTarget,
}

/// Whether the front-end must cancel the event's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Prevent,
}

impl Verdict {
    pub fn prevents_default(&self) -> bool {
        *self == Verdict::Prevent
    }
}

/// How a fullscreen-change report was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenChange {
    Ignored,
    /// Exit caused by a blocked key; re-entry is scheduled
    Bounce,
    /// The user really left fullscreen
    GenuineExit,
}

struct Shortcut {
    key: &'static str,
    ctrl: bool,
    shift: bool,
    alt: bool,
}

const fn key(key: &'static str) -> Shortcut {
    Shortcut { key, ctrl: false, shift: false, alt: false }
}

const fn ctrl(key: &'static str) -> Shortcut {
    Shortcut { key, ctrl: true, shift: false, alt: false }
}

const fn ctrl_shift(key: &'static str) -> Shortcut {
    Shortcut { key, ctrl: true, shift: true, alt: false }
}

const fn alt(key: &'static str) -> Shortcut {
    Shortcut { key, ctrl: false, shift: false, alt: true }
}

const BLOCKED_SHORTCUTS: &[Shortcut] = &[
    key("F5"),
    key("F11"),
    key("F12"),
    ctrl("t"),
    ctrl("n"),
    ctrl_shift("n"),
    ctrl_shift("i"),
    ctrl("u"),
    ctrl("s"),
    ctrl("p"),
    ctrl("r"),
    ctrl("w"),
    ctrl_shift("t"),
    ctrl("f"),
    ctrl_shift("delete"),
    alt("F4"),
    alt("F5"),
    alt("Tab"),
    alt("Escape"),
    key("PrintScreen"),
    alt("PrintScreen"),
    key("MediaPlayPause"),
    key("MediaStop"),
    key("MediaTrackNext"),
    key("MediaTrackPrevious"),
];

/// Keys whose key-up is swallowed as well
const CRITICAL_KEYS: &[&str] = &["F5", "F11", "F12"];

impl Shortcut {
    fn matches(&self, event: &KeyEvent) -> bool {
        (!self.ctrl || event.ctrl)
            && (!self.shift || event.shift)
            && (!self.alt || event.alt)
            && event.key.eq_ignore_ascii_case(self.key)
    }
}

pub struct DistractionGuard {
    state: BlockingState,
    viewport: Box<dyn Viewport>,
    monitor_interval: Duration,
    next_poll: Option<Instant>,
    /// An F11 was swallowed; the next fullscreen exit is a bounce
    blocked_exit: bool,
    bounce_check_at: Option<Instant>,
    bounce_clear_at: Option<Instant>,
    reenter_at: Option<Instant>,
}

impl DistractionGuard {
    pub fn new(viewport: Box<dyn Viewport>) -> Self {
        Self::with_interval(viewport, DEFAULT_MONITOR_INTERVAL)
    }

    pub fn with_interval(viewport: Box<dyn Viewport>, monitor_interval: Duration) -> Self {
        Self {
            state: BlockingState::default(),
            viewport,
            monitor_interval,
            next_poll: None,
            blocked_exit: false,
            bounce_check_at: None,
            bounce_clear_at: None,
            reenter_at: None,
        }
    }

    pub fn state(&self) -> BlockingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.keyboard_block_active
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock_engaged
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.state.lock_engaged = locked;
    }

    pub fn bounce_pending(&self) -> bool {
        self.blocked_exit
    }

    pub fn observe_capabilities(&mut self, capabilities: ViewportCapabilities) {
        self.viewport.observe_capabilities(capabilities);
    }

    pub fn activate(&mut self, now: Instant) {
        if !self.state.keyboard_block_active {
            self.state.keyboard_block_active = true;
            self.state.fullscreen_monitor_active = true;
            self.next_poll = Some(now + self.monitor_interval);
        }
        if !self.state.mouse_block_active {
            self.state.mouse_block_active = true;
            info!("Distraction guard engaged");
        }
    }

    /// Detach everything, however many times `activate` ran
    pub fn deactivate(&mut self) {
        if self.state.any_active() {
            info!("Distraction guard released");
        }
        self.state.keyboard_block_active = false;
        self.state.mouse_block_active = false;
        self.state.fullscreen_monitor_active = false;
        self.next_poll = None;
        self.blocked_exit = false;
        self.bounce_check_at = None;
        self.bounce_clear_at = None;
        self.reenter_at = None;
    }

    pub fn enter_fullscreen(&mut self) {
        if let Err(e) = self.viewport.request_fullscreen() {
            debug!("Skipping fullscreen request: {}", e);
        }
        if let Err(e) = self.viewport.lock_orientation() {
            debug!("Skipping orientation lock: {}", e);
        }
    }

    pub fn exit_fullscreen(&mut self) {
        if let Err(e) = self.viewport.exit_fullscreen() {
            debug!("Skipping fullscreen exit: {}", e);
        }
        if let Err(e) = self.viewport.unlock_orientation() {
            debug!("Skipping orientation unlock: {}", e);
        }
    }

    fn out_of_fullscreen(&self) -> bool {
        matches!(self.viewport.is_fullscreen(), Ok(false))
    }

    pub fn handle_key_down(&mut self, now: Instant, event: &KeyEvent) -> Verdict {
        if !self.state.keyboard_block_active {
            return Verdict::Allow;
        }

        let activation = event.key == "Enter" || event.key == " ";
        if activation && (event.target.within_control() || event.target.is_timer_display()) {
            return Verdict::Allow;
        }
        if (event.key == " " && !self.state.lock_engaged) || event.key.eq_ignore_ascii_case("m") {
            return Verdict::Allow;
        }

        if !BLOCKED_SHORTCUTS.iter().any(|shortcut| shortcut.matches(event)) {
            return Verdict::Allow;
        }

        debug!("Blocked shortcut: {}", event.key);
        if event.key == "F11" {
            self.blocked_exit = true;
            self.bounce_check_at = Some(now + BOUNCE_CHECK_DELAY);
        }
        Verdict::Prevent
    }

    pub fn handle_key_up(&self, event: &KeyEvent) -> Verdict {
        if self.state.keyboard_block_active && CRITICAL_KEYS.contains(&event.key.as_str()) {
            Verdict::Prevent
        } else {
            Verdict::Allow
        }
    }

    pub fn handle_pointer(&self, event: &PointerEvent) -> Verdict {
        if !self.state.mouse_block_active || event.target.within_control() {
            return Verdict::Allow;
        }
        match event.action {
            PointerAction::SelectStart
                if event.target.is_timer_display() && event.target.editable =>
            {
                Verdict::Allow
            }
            _ => Verdict::Prevent,
        }
    }

    pub fn on_fullscreen_change(&mut self, now: Instant, fullscreen: bool) -> FullscreenChange {
        self.viewport.observe_fullscreen(fullscreen);

        if !self.is_active() || fullscreen {
            return FullscreenChange::Ignored;
        }
        if self.blocked_exit {
            debug!("Fullscreen exit after blocked key, re-entering");
            self.reenter_at = Some(now + REENTER_DELAY);
            return FullscreenChange::Bounce;
        }
        info!("Fullscreen exited by the user");
        FullscreenChange::GenuineExit
    }

    /// Run due deferred work and the periodic fullscreen check
    pub fn poll(&mut self, now: Instant, editing: bool) {
        if self.bounce_check_at.is_some_and(|at| now >= at) {
            self.bounce_check_at = None;
            if self.is_active() && self.out_of_fullscreen() {
                self.enter_fullscreen();
            }
            self.bounce_clear_at = Some(now + BOUNCE_CLEAR_DELAY);
        }

        if self.bounce_clear_at.is_some_and(|at| now >= at) {
            self.bounce_clear_at = None;
            self.blocked_exit = false;
        }

        if self.reenter_at.is_some_and(|at| now >= at) {
            self.reenter_at = None;
            if self.is_active() {
                self.enter_fullscreen();
            }
        }

        if let Some(at) = self.next_poll {
            if now >= at {
                self.next_poll = Some(now + self.monitor_interval);
                if !self.state.lock_engaged && !editing && self.out_of_fullscreen() {
                    self.enter_fullscreen();
                }
            }
        }
    }
}
