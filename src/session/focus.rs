//! Cursor hiding over the timer overlay

use std::time::{Duration, Instant};

pub const CURSOR_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Hides the pointer after a stretch of inactivity while a session runs
#[derive(Debug)]
pub struct CursorHider {
    active: bool,
    hidden: bool,
    hide_at: Option<Instant>,
    delay: Duration,
}

impl Default for CursorHider {
    fn default() -> Self {
        Self::new(CURSOR_HIDE_DELAY)
    }
}

impl CursorHider {
    pub fn new(delay: Duration) -> Self {
        Self {
            active: false,
            hidden: false,
            hide_at: None,
            delay,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn activate(&mut self, now: Instant) {
        self.active = true;
        self.hide_at = Some(now + self.delay);
    }

    /// Returns true when the cursor became visible again
    pub fn deactivate(&mut self) -> bool {
        self.active = false;
        self.hide_at = None;
        std::mem::replace(&mut self.hidden, false)
    }

    /// Pointer moved: show it and restart the countdown
    pub fn on_pointer_move(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        self.hide_at = Some(now + self.delay);
        std::mem::replace(&mut self.hidden, false)
    }

    /// Returns true when the cursor was just hidden
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if self.active && now >= at => {
                self.hide_at = None;
                !std::mem::replace(&mut self.hidden, true)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hides_after_delay_and_shows_on_move() {
        let t0 = Instant::now();
        let mut cursor = CursorHider::default();
        cursor.activate(t0);

        assert!(!cursor.poll(t0 + Duration::from_millis(2_999)));
        assert!(cursor.poll(t0 + CURSOR_HIDE_DELAY));
        assert!(cursor.is_hidden());

        assert!(cursor.on_pointer_move(t0 + Duration::from_secs(4)));
        assert!(!cursor.is_hidden());
        assert!(!cursor.poll(t0 + Duration::from_secs(6)));
        assert!(cursor.poll(t0 + Duration::from_secs(7)));
    }

    #[test]
    fn test_deactivate_always_shows() {
        let t0 = Instant::now();
        let mut cursor = CursorHider::default();
        cursor.activate(t0);
        cursor.poll(t0 + Duration::from_secs(10));

        assert!(cursor.deactivate());
        assert!(!cursor.is_hidden());
        assert!(!cursor.on_pointer_move(t0 + Duration::from_secs(11)));
        assert!(!cursor.poll(t0 + Duration::from_secs(20)));
    }
}
