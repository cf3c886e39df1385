//! Best-effort suppression of OS-level notifications during a session

use tokio::sync::broadcast;

use crate::{
    error::CapabilityUnavailable,
    session::events::{Effect, SessionEvent},
};

pub trait NotificationSuppressor: Send {
    fn activate(&mut self) -> Result<(), CapabilityUnavailable>;

    fn deactivate(&mut self) -> Result<(), CapabilityUnavailable>;
}

/// Asks the front-end to swap out its notification constructor
pub struct ClientNotifications {
    active: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl ClientNotifications {
    pub fn new(events: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            active: false,
            events,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn toggle(&mut self, active: bool) -> Result<(), CapabilityUnavailable> {
        if self.active == active {
            return Ok(());
        }
        self.active = active;
        self.events
            .send(SessionEvent::Effect(Effect::SuppressNotifications { active }))
            .map(|_| ())
            .map_err(|_| CapabilityUnavailable("notification client"))
    }
}

impl NotificationSuppressor for ClientNotifications {
    fn activate(&mut self) -> Result<(), CapabilityUnavailable> {
        self.toggle(true)
    }

    fn deactivate(&mut self) -> Result<(), CapabilityUnavailable> {
        self.toggle(false)
    }
}
