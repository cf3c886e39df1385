//! Frame driver background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

/// Deliver countdown frames at roughly `period`.
///
/// Late or skipped ticks are harmless: the clock drains every whole second
/// elapsed since its last baseline on the next frame it sees.
pub async fn frame_driver_task(state: Arc<AppState>, period: Duration) {
    info!("Starting frame driver ({}ms period)", period.as_millis());

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = interval.tick().await.into_std();
        state.session().on_frame(now);
    }
}
