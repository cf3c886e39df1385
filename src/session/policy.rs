//! Phase durations and break cadence

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::ValidationError,
    services::storage::{keys, PreferenceStore},
    state::SessionPhase,
};

pub const DEFAULT_WORK_MINUTES: u64 = 180;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 15;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 30;
pub const DEFAULT_SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

pub const MAX_WORK_MINUTES: u64 = 180;
pub const MAX_SHORT_BREAK_MINUTES: u64 = 15;
pub const MAX_LONG_BREAK_MINUTES: u64 = 30;

/// Phase lengths in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    pub work_seconds: u64,
    pub short_break_seconds: u64,
    pub long_break_seconds: u64,
    pub sessions_before_long_break: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            work_seconds: DEFAULT_WORK_MINUTES * 60,
            short_break_seconds: DEFAULT_SHORT_BREAK_MINUTES * 60,
            long_break_seconds: DEFAULT_LONG_BREAK_MINUTES * 60,
            sessions_before_long_break: DEFAULT_SESSIONS_BEFORE_LONG_BREAK,
        }
    }
}

impl DurationConfig {
    /// Break that follows the `completed`-th finished work phase
    pub fn break_after(&self, completed: u32) -> SessionPhase {
        if completed > 0 && completed % self.sessions_before_long_break == 0 {
            SessionPhase::LongBreak
        } else {
            SessionPhase::ShortBreak
        }
    }

    /// Length of `phase`, zero for idle
    pub fn seconds_for(&self, phase: SessionPhase) -> u64 {
        match phase {
            SessionPhase::Idle => 0,
            SessionPhase::Working => self.work_seconds,
            SessionPhase::ShortBreak => self.short_break_seconds,
            SessionPhase::LongBreak => self.long_break_seconds,
        }
    }

    /// The same settings expressed the way the settings panel edits them
    pub fn as_input(&self) -> DurationInput {
        DurationInput {
            work_minutes: self.work_seconds / 60,
            short_break_minutes: self.short_break_seconds / 60,
            long_break_minutes: self.long_break_seconds / 60,
            sessions_before_long_break: self.sessions_before_long_break,
        }
    }
}

/// Durations as entered by the user, in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInput {
    pub work_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
    pub sessions_before_long_break: u32,
}

impl DurationInput {
    pub fn validate(&self) -> Result<DurationConfig, ValidationError> {
        check_minutes("work_minutes", "Pomodoro duration", self.work_minutes, MAX_WORK_MINUTES)?;
        check_minutes(
            "short_break_minutes",
            "Short break",
            self.short_break_minutes,
            MAX_SHORT_BREAK_MINUTES,
        )?;
        check_minutes(
            "long_break_minutes",
            "Long break",
            self.long_break_minutes,
            MAX_LONG_BREAK_MINUTES,
        )?;
        if self.sessions_before_long_break == 0 {
            return Err(ValidationError::new(
                "sessions_before_long_break",
                "Sessions before long break must be at least 1",
            ));
        }

        Ok(DurationConfig {
            work_seconds: self.work_minutes * 60,
            short_break_seconds: self.short_break_minutes * 60,
            long_break_seconds: self.long_break_minutes * 60,
            sessions_before_long_break: self.sessions_before_long_break,
        })
    }
}

fn check_minutes(field: &'static str, label: &str, value: u64, max: u64) -> Result<(), ValidationError> {
    if value > max {
        return Err(ValidationError::new(
            field,
            format!("{} cannot exceed {} minutes", label, max),
        ));
    }
    if value == 0 {
        return Err(ValidationError::new(
            field,
            format!("{} must be at least 1 minute", label),
        ));
    }
    Ok(())
}

/// Validated duration settings backed by the preference store
pub struct DurationPolicy {
    config: DurationConfig,
    store: Arc<dyn PreferenceStore>,
}

impl DurationPolicy {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let config = read_config(store.as_ref());
        Self { config, store }
    }

    pub fn durations(&self) -> DurationConfig {
        self.config
    }

    /// Re-read the store so edits made elsewhere apply to the next phase
    pub fn reload(&mut self) -> DurationConfig {
        self.config = read_config(self.store.as_ref());
        self.config
    }

    /// Validate, persist and adopt new durations
    pub fn set_durations(&mut self, candidate: DurationInput) -> Result<DurationConfig, ValidationError> {
        let config = candidate.validate()?;

        self.store
            .set_scalar(keys::POMODORO_DURATION, &config.work_seconds.to_string());
        self.store
            .set_scalar(keys::SHORT_BREAK_DURATION, &config.short_break_seconds.to_string());
        self.store
            .set_scalar(keys::LONG_BREAK_DURATION, &config.long_break_seconds.to_string());
        self.store.set_scalar(
            keys::SESSIONS_BEFORE_LONG_BREAK,
            &config.sessions_before_long_break.to_string(),
        );

        info!(
            "Durations updated: work={}s, short={}s, long={}s, long break every {}",
            config.work_seconds,
            config.short_break_seconds,
            config.long_break_seconds,
            config.sessions_before_long_break
        );
        self.config = config;
        Ok(config)
    }
}

/// Missing, unparsable and zero values fall back per field
fn read_config(store: &dyn PreferenceStore) -> DurationConfig {
    let defaults = DurationConfig::default();
    let positive = |key: &str| -> Option<u64> {
        store
            .get_scalar(key)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
    };

    DurationConfig {
        work_seconds: positive(keys::POMODORO_DURATION).unwrap_or(defaults.work_seconds),
        short_break_seconds: positive(keys::SHORT_BREAK_DURATION)
            .unwrap_or(defaults.short_break_seconds),
        long_break_seconds: positive(keys::LONG_BREAK_DURATION)
            .unwrap_or(defaults.long_break_seconds),
        sessions_before_long_break: positive(keys::SESSIONS_BEFORE_LONG_BREAK)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(defaults.sessions_before_long_break),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;

    fn input(work: u64, short: u64, long: u64, sessions: u32) -> DurationInput {
        DurationInput {
            work_minutes: work,
            short_break_minutes: short,
            long_break_minutes: long,
            sessions_before_long_break: sessions,
        }
    }

    #[test]
    fn test_cycle_policy_every_fourth() {
        let config = DurationConfig::default();
        let breaks: Vec<_> = (1..=8).map(|n| config.break_after(n)).collect();

        assert_eq!(
            breaks,
            vec![
                SessionPhase::ShortBreak,
                SessionPhase::ShortBreak,
                SessionPhase::ShortBreak,
                SessionPhase::LongBreak,
                SessionPhase::ShortBreak,
                SessionPhase::ShortBreak,
                SessionPhase::ShortBreak,
                SessionPhase::LongBreak,
            ]
        );
        assert_eq!(config.break_after(0), SessionPhase::ShortBreak);
    }

    #[test]
    fn test_validation_bounds() {
        assert!(input(180, 15, 30, 1).validate().is_ok());
        assert!(input(1, 1, 1, 1).validate().is_ok());

        assert_eq!(input(181, 5, 5, 4).validate().unwrap_err().field, "work_minutes");
        assert_eq!(input(0, 5, 5, 4).validate().unwrap_err().field, "work_minutes");
        assert_eq!(input(25, 16, 5, 4).validate().unwrap_err().field, "short_break_minutes");
        assert_eq!(input(25, 5, 31, 4).validate().unwrap_err().field, "long_break_minutes");
        assert_eq!(
            input(25, 5, 15, 0).validate().unwrap_err().field,
            "sessions_before_long_break"
        );
    }

    #[test]
    fn test_defaults_when_store_empty_or_bad() {
        let store = Arc::new(MemoryStore::new());
        store.set_scalar(keys::POMODORO_DURATION, "abc");
        store.set_scalar(keys::SHORT_BREAK_DURATION, "0");

        let policy = DurationPolicy::load(store);
        assert_eq!(policy.durations(), DurationConfig::default());
    }

    #[test]
    fn test_set_durations_persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let mut policy = DurationPolicy::load(store.clone());

        let config = policy.set_durations(input(25, 5, 20, 3)).unwrap();
        assert_eq!(config.work_seconds, 1500);
        assert_eq!(store.get_scalar(keys::LONG_BREAK_DURATION).as_deref(), Some("1200"));

        let reloaded = DurationPolicy::load(store);
        assert_eq!(reloaded.durations(), config);
        assert_eq!(reloaded.durations().as_input(), input(25, 5, 20, 3));
    }

    #[test]
    fn test_rejected_durations_leave_config_untouched() {
        let store = Arc::new(MemoryStore::new());
        let mut policy = DurationPolicy::load(store.clone());

        assert!(policy.set_durations(input(200, 5, 20, 3)).is_err());
        assert_eq!(policy.durations(), DurationConfig::default());
        assert!(store.get_scalar(keys::POMODORO_DURATION).is_none());
    }
}
