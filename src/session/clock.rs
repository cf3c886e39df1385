//! Frame-driven countdown
//!
//! The clock does not schedule anything itself. A driver calls [`SessionClock::on_frame`]
//! with the current instant whenever a frame is delivered, at whatever irregular
//! rate it manages, and the clock drains every whole second elapsed since the
//! previous baseline.

use std::time::{Duration, Instant};

use crate::error::InvalidStateError;

const SECOND: Duration = Duration::from_secs(1);

/// Result of feeding one frame to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Whole seconds drained during this frame
    pub elapsed: u64,
    pub remaining: u64,
    /// Set exactly once per `start`, on the frame that reaches zero
    pub completed: bool,
}

#[derive(Debug, Default)]
pub struct SessionClock {
    remaining: u64,
    running: bool,
    last_frame: Option<Instant>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, now: Instant, duration_seconds: u64) {
        self.remaining = duration_seconds;
        self.last_frame = Some(now);
        self.running = true;
    }

    /// Stop advancing; returns whether the clock was running
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Continue from the current remaining time, ignoring time spent paused
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.last_frame = Some(now);
        self.running = true;
        true
    }

    pub fn set_remaining(&mut self, seconds: u64) -> Result<(), InvalidStateError> {
        if self.running {
            return Err(InvalidStateError("cannot set remaining time while the clock runs"));
        }
        self.remaining = seconds;
        Ok(())
    }

    pub fn on_frame(&mut self, now: Instant) -> FrameReport {
        let mut report = FrameReport {
            remaining: self.remaining,
            ..FrameReport::default()
        };
        if !self.running {
            return report;
        }

        let mut baseline = *self.last_frame.get_or_insert(now);
        let mut delta = now.saturating_duration_since(baseline);

        while delta >= SECOND && self.remaining > 0 {
            self.remaining -= 1;
            report.elapsed += 1;
            delta -= SECOND;
            baseline += SECOND;
        }
        self.last_frame = Some(baseline);
        report.remaining = self.remaining;

        if self.remaining == 0 {
            self.running = false;
            report.completed = true;
        }
        report
    }
}
