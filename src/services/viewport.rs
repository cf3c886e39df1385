//! Viewport backed by the front-end's fullscreen and orientation APIs

use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    error::CapabilityUnavailable,
    session::{
        events::{Effect, SessionEvent},
        guard::{Viewport, ViewportCapabilities},
    },
};

/// Mirrors what the client last reported and forwards requests to it
pub struct ClientViewport {
    capabilities: ViewportCapabilities,
    fullscreen: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl ClientViewport {
    /// Capabilities start unknown, which behaves as unsupported
    pub fn new(events: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            capabilities: ViewportCapabilities::default(),
            fullscreen: false,
            events,
        }
    }

    fn send(&self, effect: Effect, what: &'static str) -> Result<(), CapabilityUnavailable> {
        self.events
            .send(SessionEvent::Effect(effect))
            .map(|_| ())
            .map_err(|_| CapabilityUnavailable(what))
    }
}

impl Viewport for ClientViewport {
    fn is_fullscreen(&self) -> Result<bool, CapabilityUnavailable> {
        if !self.capabilities.fullscreen {
            return Err(CapabilityUnavailable("fullscreen"));
        }
        Ok(self.fullscreen)
    }

    fn request_fullscreen(&mut self) -> Result<(), CapabilityUnavailable> {
        if !self.capabilities.fullscreen {
            return Err(CapabilityUnavailable("fullscreen"));
        }
        self.send(Effect::EnterFullscreen, "fullscreen")
    }

    fn exit_fullscreen(&mut self) -> Result<(), CapabilityUnavailable> {
        if !self.capabilities.fullscreen {
            return Err(CapabilityUnavailable("fullscreen"));
        }
        self.send(Effect::ExitFullscreen, "fullscreen")
    }

    fn lock_orientation(&mut self) -> Result<(), CapabilityUnavailable> {
        if !self.capabilities.orientation_lock {
            return Err(CapabilityUnavailable("orientation lock"));
        }
        self.send(Effect::LockOrientation, "orientation lock")
    }

    fn unlock_orientation(&mut self) -> Result<(), CapabilityUnavailable> {
        if !self.capabilities.orientation_lock {
            return Err(CapabilityUnavailable("orientation lock"));
        }
        self.send(Effect::UnlockOrientation, "orientation lock")
    }

    fn observe_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    fn observe_capabilities(&mut self, capabilities: ViewportCapabilities) {
        debug!(
            "Viewport capabilities: fullscreen={}, orientation_lock={}",
            capabilities.fullscreen, capabilities.orientation_lock
        );
        self.capabilities = capabilities;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_need_reported_capabilities() {
        let (tx, mut rx) = broadcast::channel(8);
        let mut viewport = ClientViewport::new(tx);

        assert!(viewport.request_fullscreen().is_err());
        assert!(viewport.is_fullscreen().is_err());

        viewport.observe_capabilities(ViewportCapabilities {
            fullscreen: true,
            orientation_lock: false,
        });
        viewport.request_fullscreen().unwrap();
        assert!(viewport.lock_orientation().is_err());
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Effect(Effect::EnterFullscreen));

        viewport.observe_fullscreen(true);
        assert_eq!(viewport.is_fullscreen(), Ok(true));
    }
}
