//! Guard monitor background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

/// Polling resolution for the guard's short deferred timers
pub const GUARD_RESOLUTION: Duration = Duration::from_millis(10);

/// Poll the orchestrator so due guard timers, the fullscreen re-assert check,
/// cursor hiding and edit-error expiry all run
pub async fn guard_monitor_task(state: Arc<AppState>) {
    info!("Starting guard monitor");

    let mut interval = interval(GUARD_RESOLUTION);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let now = interval.tick().await.into_std();
        state.session().poll(now);
    }
}
