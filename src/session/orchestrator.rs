//! Session orchestrator
//!
//! Owns the phase state machine and is the only writer of [`TimerState`]. Every
//! public method is one synchronous handler: callers serialise access (the
//! service keeps the orchestrator behind a single mutex), so a phase change
//! triggered by a completed countdown can never interleave with user input.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{
    clock::SessionClock,
    events::{Effect, SessionEvent},
    focus::CursorHider,
    guard::{
        DistractionGuard, FullscreenChange, KeyEvent, PointerEvent, Verdict, Viewport,
        ViewportCapabilities,
    },
    policy::{DurationConfig, DurationInput, DurationPolicy},
};
use crate::{
    error::{SessionError, ValidationError},
    services::{
        audio::AmbientAudio,
        notifications::NotificationSuppressor,
        storage::{keys, PreferenceStore},
        todos::TaskProvider,
    },
    state::{format_clock, BlockingState, SessionPhase, TaskId, TimerSnapshot, TimerState},
};

/// Longest time the timer display accepts when edited
pub const MAX_EDIT_SECONDS: u64 = 3 * 3600;
/// How long an edit error stays on screen
pub const EDIT_ERROR_DISPLAY: Duration = Duration::from_millis(2500);

/// External collaborators handed to the orchestrator at construction
pub struct Collaborators {
    pub store: Arc<dyn PreferenceStore>,
    pub tasks: Box<dyn TaskProvider>,
    pub audio: Box<dyn AmbientAudio>,
    pub notifications: Box<dyn NotificationSuppressor>,
    pub viewport: Box<dyn Viewport>,
}

/// Action triggered by a keyboard shortcut the guard let through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    TogglePause,
    ToggleMusic,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub verdict: Verdict,
    pub action: Option<ShortcutAction>,
}

impl KeyOutcome {
    pub fn prevents_default(&self) -> bool {
        self.verdict.prevents_default() || self.action.is_some()
    }
}

pub struct Orchestrator {
    state: TimerState,
    completed_sessions: u32,
    policy: DurationPolicy,
    clock: SessionClock,
    guard: DistractionGuard,
    cursor: CursorHider,
    store: Arc<dyn PreferenceStore>,
    tasks: Box<dyn TaskProvider>,
    audio: Box<dyn AmbientAudio>,
    notifications: Box<dyn NotificationSuppressor>,
    edit_error: Option<(String, Instant)>,
    events: broadcast::Sender<SessionEvent>,
}

impl Orchestrator {
    /// Build an idle orchestrator from persisted preferences
    pub fn new(
        collaborators: Collaborators,
        events: broadcast::Sender<SessionEvent>,
        monitor_interval: Duration,
    ) -> Self {
        let Collaborators {
            store,
            tasks,
            audio,
            notifications,
            viewport,
        } = collaborators;

        let is_locked = store.get_flag(keys::IS_LOCKED, false);
        let mut guard = DistractionGuard::with_interval(viewport, monitor_interval);
        guard.set_locked(is_locked);

        Self {
            state: TimerState::new(is_locked),
            completed_sessions: 0,
            policy: DurationPolicy::load(Arc::clone(&store)),
            clock: SessionClock::new(),
            guard,
            cursor: CursorHider::default(),
            store,
            tasks,
            audio,
            notifications,
            edit_error: None,
            events,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn blocking(&self) -> BlockingState {
        self.guard.state()
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn durations(&self) -> DurationConfig {
        self.policy.durations()
    }

    pub fn music_enabled(&self) -> bool {
        self.audio.is_enabled()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let title = match self.state.active_task {
            Some(task) => self.tasks.display_title(task),
            None => self.state.phase.break_title().map(str::to_string),
        };

        TimerSnapshot {
            state: self.state.clone(),
            title,
            display: format_clock(self.state.remaining_seconds),
            completed_sessions: self.completed_sessions,
            cursor_hidden: self.cursor.is_hidden(),
            edit_error: self.edit_error.as_ref().map(|(message, _)| message.clone()),
        }
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine; the state is still queryable
        let _ = self.events.send(event);
    }

    fn emit_phase(&self, title: Option<String>) {
        self.emit(SessionEvent::PhaseChanged {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            title,
        });
    }

    fn play_audio(&mut self, reset: bool) {
        if let Err(e) = self.audio.play(reset) {
            debug!("Audio play skipped: {}", e);
        }
    }

    fn pause_audio(&mut self) {
        if let Err(e) = self.audio.pause() {
            debug!("Audio pause skipped: {}", e);
        }
    }

    fn stop_audio(&mut self) {
        if let Err(e) = self.audio.stop() {
            debug!("Audio stop skipped: {}", e);
        }
    }

    /// Start a work phase on `task`; ignored while a phase is active
    pub fn start(&mut self, now: Instant, task: TaskId) -> Result<bool, SessionError> {
        if self.state.phase.is_active() {
            debug!("Ignoring start of task {}: a {} phase is active", task, self.state.phase.as_str());
            return Ok(false);
        }
        let title = self
            .tasks
            .display_title(task)
            .ok_or(SessionError::UnknownTask(task))?;

        self.begin_work(now, task, title);
        Ok(true)
    }

    fn begin_work(&mut self, now: Instant, task: TaskId, title: String) {
        let durations = self.policy.reload();

        self.state.phase = SessionPhase::Working;
        self.state.active_task = Some(task);
        self.state.is_paused = false;
        self.state.is_editing = false;
        self.state.remaining_seconds = durations.work_seconds;
        self.edit_error = None;
        self.clock.start(now, durations.work_seconds);

        self.guard.set_locked(self.state.is_locked);
        self.guard.activate(now);
        self.guard.enter_fullscreen();
        self.cursor.activate(now);
        if let Err(e) = self.notifications.activate() {
            debug!("Notification suppression skipped: {}", e);
        }
        self.play_audio(true);

        info!("Working on task {} ({}) for {}s", task, title, durations.work_seconds);
        self.emit_phase(Some(title));
    }

    fn begin_break(&mut self, now: Instant) {
        let durations = self.policy.reload();
        let phase = durations.break_after(self.completed_sessions);

        self.state.phase = phase;
        self.state.active_task = None;
        self.state.is_paused = false;
        self.state.remaining_seconds = durations.seconds_for(phase);
        self.clock.start(now, self.state.remaining_seconds);
        self.play_audio(true);

        info!(
            "Starting {} for {}s after {} completed sessions",
            phase.as_str(),
            self.state.remaining_seconds,
            self.completed_sessions
        );
        self.emit_phase(phase.break_title().map(str::to_string));
    }

    fn on_phase_complete(&mut self, now: Instant) {
        match self.state.phase {
            SessionPhase::Working => {
                if let Some(task) = self.state.active_task {
                    self.tasks.mark_complete(task);
                    self.completed_sessions += 1;
                    self.emit(SessionEvent::TaskCompleted {
                        task,
                        completed_sessions: self.completed_sessions,
                    });
                }
                self.begin_break(now);
            }
            SessionPhase::ShortBreak | SessionPhase::LongBreak => {
                match self.tasks.find_next_incomplete() {
                    Some(next) => {
                        let title = self.tasks.display_title(next).unwrap_or_default();
                        self.begin_work(now, next, title);
                    }
                    None => {
                        info!("No incomplete tasks left, cycle finished");
                        self.end_session();
                    }
                }
            }
            SessionPhase::Idle => {}
        }
    }

    /// Tear down every effect and return to idle
    fn end_session(&mut self) {
        self.clock.pause();
        self.guard.deactivate();
        self.guard.exit_fullscreen();
        if self.cursor.deactivate() {
            self.emit(SessionEvent::Effect(Effect::HideCursor { hidden: false }));
        }
        if let Err(e) = self.notifications.deactivate() {
            debug!("Notification restore skipped: {}", e);
        }
        self.stop_audio();

        self.state.reset();
        self.edit_error = None;
        self.emit_phase(None);
    }

    /// Commands that pause, stop or edit are refused while locked or editing
    fn controls_enabled(&self, command: &str) -> bool {
        let reason = if self.state.is_locked {
            "timer is locked"
        } else if !self.state.phase.is_active() {
            "no active session"
        } else if self.state.is_editing {
            "timer is being edited"
        } else {
            return true;
        };
        debug!("Ignoring {}: {}", command, reason);
        false
    }

    pub fn pause(&mut self) -> bool {
        if !self.controls_enabled("pause") || self.state.is_paused {
            return false;
        }
        self.clock.pause();
        self.state.is_paused = true;
        self.pause_audio();
        info!("Paused with {}s left", self.state.remaining_seconds);
        self.emit(SessionEvent::PauseChanged { paused: true });
        true
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if !self.controls_enabled("resume") || !self.state.is_paused {
            return false;
        }
        self.clock.resume(now);
        self.state.is_paused = false;
        self.play_audio(false);
        info!("Resumed with {}s left", self.state.remaining_seconds);
        self.emit(SessionEvent::PauseChanged { paused: false });
        true
    }

    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        if self.state.is_paused {
            self.resume(now)
        } else {
            self.pause()
        }
    }

    pub fn stop(&mut self) -> bool {
        if !self.controls_enabled("stop") {
            return false;
        }
        info!("Session stopped in {} phase", self.state.phase.as_str());
        self.end_session();
        true
    }

    pub fn begin_edit(&mut self) -> bool {
        if !self.controls_enabled("edit") {
            return false;
        }
        if self.clock.pause() {
            self.state.is_paused = true;
            self.pause_audio();
            self.emit(SessionEvent::PauseChanged { paused: true });
        }
        self.state.is_editing = true;
        self.emit(SessionEvent::EditStarted {
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Apply edited timer text; on failure the timer stays in edit mode
    pub fn commit_edit(&mut self, now: Instant, text: &str) -> Result<bool, SessionError> {
        if self.state.is_locked || !self.state.is_editing {
            debug!("Ignoring edit commit: not editing or locked");
            return Ok(false);
        }

        let seconds = match parse_edit_time(text) {
            Ok(seconds) => seconds,
            Err(e) => {
                debug!("Rejected edited time {:?}: {}", text, e);
                self.edit_error = Some((e.reason.clone(), now + EDIT_ERROR_DISPLAY));
                self.emit(SessionEvent::EditError {
                    message: e.reason.clone(),
                });
                return Err(e.into());
            }
        };

        self.clock.pause();
        self.clock.set_remaining(seconds)?;
        self.state.remaining_seconds = seconds;
        self.state.is_editing = false;
        self.edit_error = None;
        info!("Timer edited to {}", format_clock(seconds));
        self.emit(SessionEvent::EditCommitted {
            remaining_seconds: seconds,
        });

        if seconds > 0 {
            self.clock.resume(now);
            self.state.is_paused = false;
            self.play_audio(false);
            self.emit(SessionEvent::PauseChanged { paused: false });
        }
        Ok(true)
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.state.is_locked = locked;
        self.guard.set_locked(locked);
        self.store.set_flag(keys::IS_LOCKED, locked);
        info!("Timer lock {}", if locked { "engaged" } else { "released" });
        self.emit(SessionEvent::LockChanged { locked });
    }

    /// Takes effect from the next phase; the running phase keeps its length
    pub fn set_durations(&mut self, candidate: DurationInput) -> Result<DurationConfig, ValidationError> {
        self.policy.set_durations(candidate)
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.audio.set_enabled(enabled);
        if !enabled {
            self.pause_audio();
        } else if self.state.is_running() {
            self.play_audio(false);
        }
        info!("Music {}", if enabled { "enabled" } else { "muted" });
        self.emit(SessionEvent::MusicChanged { enabled });
    }

    pub fn toggle_music(&mut self) -> bool {
        let enabled = !self.audio.is_enabled();
        self.set_music_enabled(enabled);
        enabled
    }

    /// Clear stored preferences; only while idle
    pub fn reset(&mut self) -> bool {
        if self.state.phase.is_active() {
            debug!("Ignoring reset during an active session");
            return false;
        }
        self.store.clear_all();
        self.policy.reload();
        self.completed_sessions = 0;
        self.state.is_locked = false;
        self.guard.set_locked(false);
        info!("Preferences reset to defaults");
        self.emit(SessionEvent::LockChanged { locked: false });
        true
    }

    pub fn handle_key_down(&mut self, now: Instant, event: &KeyEvent) -> KeyOutcome {
        let verdict = self.guard.handle_key_down(now, event);
        let mut outcome = KeyOutcome {
            verdict,
            action: None,
        };
        if verdict.prevents_default() || !self.state.phase.is_active() || self.state.is_editing {
            return outcome;
        }

        outcome.action = match event.key.as_str() {
            " " if !self.state.is_locked => {
                self.toggle_pause(now);
                Some(ShortcutAction::TogglePause)
            }
            "m" | "M" => {
                self.toggle_music();
                Some(ShortcutAction::ToggleMusic)
            }
            "Escape" if !self.state.is_locked => {
                self.stop();
                Some(ShortcutAction::Stop)
            }
            _ => None,
        };
        outcome
    }

    pub fn handle_key_up(&self, event: &KeyEvent) -> Verdict {
        self.guard.handle_key_up(event)
    }

    pub fn handle_pointer(&self, event: &PointerEvent) -> Verdict {
        self.guard.handle_pointer(event)
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        if self.cursor.on_pointer_move(now) {
            self.emit(SessionEvent::Effect(Effect::HideCursor { hidden: false }));
        }
    }

    pub fn set_viewport_capabilities(&mut self, capabilities: ViewportCapabilities) {
        self.guard.observe_capabilities(capabilities);
    }

    /// Fullscreen-change report from the display surface
    pub fn fullscreen_changed(&mut self, now: Instant, fullscreen: bool) -> FullscreenChange {
        let change = self.guard.on_fullscreen_change(now, fullscreen);
        if change == FullscreenChange::GenuineExit {
            if self.state.is_locked {
                debug!("Fullscreen exit ignored: timer is locked");
            } else {
                info!("Session stopped by fullscreen exit");
                self.end_session();
            }
        }
        change
    }

    /// Animation-frame handler: advance the countdown
    pub fn on_frame(&mut self, now: Instant) {
        if !self.state.is_running() {
            return;
        }
        let report = self.clock.on_frame(now);
        if report.elapsed > 0 {
            self.state.remaining_seconds = report.remaining;
            self.emit(SessionEvent::Tick {
                remaining_seconds: report.remaining,
            });
        }
        if report.completed {
            self.on_phase_complete(now);
        }
    }

    /// Poller handler: guard timers, cursor hiding, edit error expiry
    pub fn poll(&mut self, now: Instant) {
        self.guard.poll(now, self.state.is_editing);

        if self.cursor.poll(now) {
            self.emit(SessionEvent::Effect(Effect::HideCursor { hidden: true }));
        }

        if self.edit_error.as_ref().is_some_and(|(_, until)| now >= *until) {
            self.edit_error = None;
            self.emit(SessionEvent::EditErrorCleared);
        }
    }
}

/// Parse `[[HH:]MM:]SS`-style timer text into seconds.
///
/// A single number is minutes, two are minutes and seconds, three are hours,
/// minutes and seconds. Non-digit characters other than `:` are ignored.
pub fn parse_edit_time(text: &str) -> Result<u64, ValidationError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let parts: Vec<u64> = cleaned
        .split(':')
        .map(|part| part.parse().unwrap_or(0))
        .collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m] => (0, *m, 0),
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => (0, 0, 0),
    };

    if seconds >= 60 {
        return Err(ValidationError::new("seconds", "⚠ Seconds: 0-59"));
    }
    if minutes >= 60 {
        return Err(ValidationError::new("minutes", "⚠ Minutes: 0-59"));
    }
    if hours > 3 {
        return Err(ValidationError::new("hours", "⚠ Max 3 hours"));
    }
    let total = hours * 3600 + minutes * 60 + seconds;
    if total > MAX_EDIT_SECONDS {
        return Err(ValidationError::new("hours", "⚠ Max 03:00:00"));
    }
    if total == 0 {
        return Err(ValidationError::new("time", "⚠ Set valid time"));
    }
    Ok(total)
}
