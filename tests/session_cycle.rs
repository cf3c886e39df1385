//! End-to-end Pomodoro cycles driven with synthetic instants

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use focus_lock::{
    services::{
        storage::keys, ClientAudio, ClientNotifications, ClientViewport, FileStore, MemoryStore,
        PreferenceStore, SharedTasks, TaskList,
    },
    session::{
        guard::DEFAULT_MONITOR_INTERVAL, Collaborators, Effect, FullscreenChange, Orchestrator,
        SessionEvent, ViewportCapabilities,
    },
    state::SessionPhase,
};
use tokio::sync::broadcast;

struct Rig {
    session: Orchestrator,
    tasks: SharedTasks,
    events: broadcast::Receiver<SessionEvent>,
    t0: Instant,
}

impl Rig {
    fn new(store: Arc<dyn PreferenceStore>, titles: &[&str]) -> Self {
        let mut list = TaskList::load(Arc::clone(&store));
        for title in titles {
            list.add(title, false);
        }
        let tasks = SharedTasks::new(list);
        let (tx, rx) = broadcast::channel(4096);

        let mut session = Orchestrator::new(
            Collaborators {
                store: Arc::clone(&store),
                tasks: Box::new(tasks.clone()),
                audio: Box::new(ClientAudio::new(Arc::clone(&store), tx.clone())),
                notifications: Box::new(ClientNotifications::new(tx.clone())),
                viewport: Box::new(ClientViewport::new(tx.clone())),
            },
            tx,
            DEFAULT_MONITOR_INTERVAL,
        );
        session.set_viewport_capabilities(ViewportCapabilities {
            fullscreen: true,
            orientation_lock: false,
        });

        Self {
            session,
            tasks,
            events: rx,
            t0: Instant::now(),
        }
    }

    fn at(&self, millis: u64) -> Instant {
        self.t0 + Duration::from_millis(millis)
    }

    /// Frames and polls every 100ms up to `until`
    fn run_until(&mut self, from: u64, until: u64) {
        let mut t = from;
        while t <= until {
            let now = self.at(t);
            self.session.on_frame(now);
            self.session.poll(now);
            t += 100;
        }
    }

    fn phases(&mut self) -> Vec<(SessionPhase, u64)> {
        std::iter::from_fn(|| self.events.try_recv().ok())
            .filter_map(|event| match event {
                SessionEvent::PhaseChanged {
                    phase,
                    remaining_seconds,
                    ..
                } => Some((phase, remaining_seconds)),
                _ => None,
            })
            .collect()
    }
}

fn seeded_store(work: u64, short: u64, long: u64, sessions: u32) -> Arc<dyn PreferenceStore> {
    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
    store.set_scalar(keys::POMODORO_DURATION, &work.to_string());
    store.set_scalar(keys::SHORT_BREAK_DURATION, &short.to_string());
    store.set_scalar(keys::LONG_BREAK_DURATION, &long.to_string());
    store.set_scalar(keys::SESSIONS_BEFORE_LONG_BREAK, &sessions.to_string());
    store
}

#[test]
fn test_one_cycle_with_short_break() {
    let mut rig = Rig::new(seeded_store(5, 3, 4, 2), &["A", "B"]);
    let start = rig.at(0);
    assert!(rig.session.start(start, 1).unwrap());

    rig.run_until(100, 5_000);
    assert_eq!(rig.session.state().phase, SessionPhase::ShortBreak);
    assert_eq!(rig.session.state().remaining_seconds, 3);
    assert_eq!(rig.session.completed_sessions(), 1);
    assert!(rig.tasks.lock().tasks()[0].completed);

    rig.run_until(5_100, 8_000);
    assert_eq!(rig.session.state().phase, SessionPhase::Working);
    assert_eq!(rig.session.state().active_task, Some(2));
    assert_eq!(rig.session.snapshot().title.as_deref(), Some("B"));

    assert_eq!(
        rig.phases(),
        vec![
            (SessionPhase::Working, 5),
            (SessionPhase::ShortBreak, 3),
            (SessionPhase::Working, 5),
        ]
    );
}

#[test]
fn test_second_completion_takes_long_break_then_idles() {
    let mut rig = Rig::new(seeded_store(5, 3, 4, 2), &["A", "B"]);
    let start = rig.at(0);
    rig.session.start(start, 1).unwrap();

    rig.run_until(100, 13_000);
    assert_eq!(rig.session.state().phase, SessionPhase::LongBreak);
    assert_eq!(rig.session.completed_sessions(), 2);
    assert_eq!(rig.session.snapshot().title.as_deref(), Some("Long Break"));

    rig.run_until(13_100, 20_000);
    let state = rig.session.state();
    assert_eq!(state.phase, SessionPhase::Idle);
    assert_eq!(state.remaining_seconds, 0);
    assert!(!rig.session.blocking().any_active());

    let phases: Vec<_> = rig.phases().into_iter().map(|(phase, _)| phase).collect();
    assert_eq!(
        phases,
        vec![
            SessionPhase::Working,
            SessionPhase::ShortBreak,
            SessionPhase::Working,
            SessionPhase::LongBreak,
            SessionPhase::Idle,
        ]
    );
}

#[test]
fn test_effects_follow_session_lifecycle() {
    let mut rig = Rig::new(seeded_store(60, 3, 4, 4), &["A"]);
    let start = rig.at(0);
    rig.session.start(start, 1).unwrap();
    rig.run_until(100, 3_000);

    // the user leaves fullscreen without a blocked key
    let exit = rig.at(3_050);
    assert_eq!(
        rig.session.fullscreen_changed(exit, false),
        FullscreenChange::GenuineExit
    );
    assert_eq!(rig.session.state().phase, SessionPhase::Idle);

    let effects: Vec<Effect> = std::iter::from_fn(|| rig.events.try_recv().ok())
        .filter_map(|event| match event {
            SessionEvent::Effect(effect) => Some(effect),
            _ => None,
        })
        .collect();

    assert_eq!(effects.first(), Some(&Effect::EnterFullscreen));
    assert!(effects.contains(&Effect::SuppressNotifications { active: true }));
    assert!(effects.contains(&Effect::PlayAudio { reset: true }));
    assert!(effects.contains(&Effect::HideCursor { hidden: true }));

    let tail = &effects[effects.len() - 4..];
    assert_eq!(
        tail,
        &[
            Effect::ExitFullscreen,
            Effect::HideCursor { hidden: false },
            Effect::SuppressNotifications { active: false },
            Effect::StopAudio,
        ]
    );
}

#[test]
fn test_preferences_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    {
        let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::open(&path).unwrap());
        let mut rig = Rig::new(store, &["Persisted task"]);
        rig.session.set_locked(true);
        rig.session.set_music_enabled(false);
    }

    let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::open(&path).unwrap());
    let rig = Rig::new(store, &[]);
    assert!(rig.session.state().is_locked);
    assert!(!rig.session.music_enabled());
    assert_eq!(rig.tasks.lock().tasks()[0].title, "Persisted task");
}
