//! Blocking state structure

use serde::{Deserialize, Serialize};

/// Which parts of the distraction guard are engaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockingState {
    pub keyboard_block_active: bool,
    pub mouse_block_active: bool,
    pub fullscreen_monitor_active: bool,
    /// User preference disabling pause/stop/edit
    pub lock_engaged: bool,
}

impl BlockingState {
    /// Check if any input interception is active
    pub fn any_active(&self) -> bool {
        self.keyboard_block_active || self.mouse_block_active || self.fullscreen_monitor_active
    }
}
