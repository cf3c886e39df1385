//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    services::{
        ClientAudio, ClientNotifications, ClientViewport, PreferenceStore, SharedTasks, TaskList,
    },
    session::{Collaborators, Orchestrator, SessionEvent},
};

/// Capacity of the session event channel; slow SSE clients lag past this
const EVENT_CAPACITY: usize = 256;

/// Shared state behind every handler and background driver
pub struct AppState {
    /// The single session orchestrator; every handler runs under this lock
    pub session: Mutex<Orchestrator>,
    /// Task list, also handed to the orchestrator as its task provider
    pub tasks: SharedTasks,
    pub store: Arc<dyn PreferenceStore>,
    /// Session events, fanned out to SSE subscribers
    pub events: broadcast::Sender<SessionEvent>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Wire the orchestrator to client-backed collaborators over `store`
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        port: u16,
        host: String,
        monitor_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let tasks = SharedTasks::new(TaskList::load(Arc::clone(&store)));

        let collaborators = Collaborators {
            store: Arc::clone(&store),
            tasks: Box::new(tasks.clone()),
            audio: Box::new(ClientAudio::new(Arc::clone(&store), events.clone())),
            notifications: Box::new(ClientNotifications::new(events.clone())),
            viewport: Box::new(ClientViewport::new(events.clone())),
        };
        let session = Orchestrator::new(collaborators, events.clone(), monitor_interval);

        Self {
            session: Mutex::new(session),
            tasks,
            store,
            events,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Lock the orchestrator, recovering from a poisoned lock
    pub fn session(&self) -> MutexGuard<'_, Orchestrator> {
        self.session.lock().unwrap_or_else(|poisoned| {
            warn!("Session lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Remember the last command that changed the session
    pub fn record_action(&self, action: &str) {
        debug!("Recording action: {}", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{storage::keys, MemoryStore},
        session::guard::DEFAULT_MONITOR_INTERVAL,
        state::SessionPhase,
    };

    fn state_with(store: Arc<dyn PreferenceStore>) -> AppState {
        AppState::new(store, 20554, "127.0.0.1".to_string(), DEFAULT_MONITOR_INTERVAL)
    }

    #[test]
    fn test_new_state_is_idle_and_restores_lock() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        store.set_flag(keys::IS_LOCKED, true);

        let state = state_with(store);
        let session = state.session();
        assert_eq!(session.state().phase, SessionPhase::Idle);
        assert!(session.state().is_locked);
        assert!(session.blocking().lock_engaged);
    }

    #[test]
    fn test_record_action() {
        let state = state_with(Arc::new(MemoryStore::new()));
        assert_eq!(state.get_last_action(), (None, None));

        state.record_action("start");
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("start"));
        assert!(time.is_some());
    }

    #[test]
    fn test_events_reach_subscribers() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let mut rx = state.subscribe();

        state.session().set_locked(true);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::LockChanged { locked: true });
    }
}
