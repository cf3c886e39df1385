//! Ambient audio played during focus phases

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::storage::{keys, PreferenceStore};
use crate::{
    error::CapabilityUnavailable,
    session::events::{Effect, SessionEvent},
};

/// Background music contract; callers swallow failures
pub trait AmbientAudio: Send {
    fn play(&mut self, reset_to_start: bool) -> Result<(), CapabilityUnavailable>;

    fn pause(&mut self) -> Result<(), CapabilityUnavailable>;

    fn stop(&mut self) -> Result<(), CapabilityUnavailable>;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);
}

/// Last playback request sent to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Playback {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Audio driven by the front-end's audio element
pub struct ClientAudio {
    enabled: bool,
    playback: Playback,
    store: Arc<dyn PreferenceStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl ClientAudio {
    /// Music is enabled unless the stored preference says otherwise
    pub fn new(store: Arc<dyn PreferenceStore>, events: broadcast::Sender<SessionEvent>) -> Self {
        let enabled = store.get_flag(keys::MUSIC_ENABLED, true);
        Self {
            enabled,
            playback: Playback::Stopped,
            store,
            events,
        }
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    fn send(&self, effect: Effect) -> Result<(), CapabilityUnavailable> {
        self.events
            .send(SessionEvent::Effect(effect))
            .map(|_| ())
            .map_err(|_| CapabilityUnavailable("audio client"))
    }
}

impl AmbientAudio for ClientAudio {
    fn play(&mut self, reset_to_start: bool) -> Result<(), CapabilityUnavailable> {
        if !self.enabled {
            debug!("Music disabled, not playing");
            return Ok(());
        }
        self.playback = Playback::Playing;
        self.send(Effect::PlayAudio {
            reset: reset_to_start,
        })
    }

    fn pause(&mut self) -> Result<(), CapabilityUnavailable> {
        if self.playback != Playback::Playing {
            return Ok(());
        }
        self.playback = Playback::Paused;
        self.send(Effect::PauseAudio)
    }

    fn stop(&mut self) -> Result<(), CapabilityUnavailable> {
        if self.playback == Playback::Stopped {
            return Ok(());
        }
        self.playback = Playback::Stopped;
        self.send(Effect::StopAudio)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.store.set_flag(keys::MUSIC_ENABLED, enabled);
    }
}
