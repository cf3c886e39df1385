//! Persistent preference storage
//!
//! Preferences are flat string-keyed values. Scalars are stored as strings,
//! structured values as JSON. A missing key always means "use the default".

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Storage keys used by the focus session
pub mod keys {
    pub const TODOS: &str = "todos";
    pub const POMODORO_DURATION: &str = "pomodoroDuration";
    pub const SHORT_BREAK_DURATION: &str = "shortBreakDuration";
    pub const LONG_BREAK_DURATION: &str = "longBreakDuration";
    pub const SESSIONS_BEFORE_LONG_BREAK: &str = "sessionsBeforeLongBreak";
    pub const MUSIC_ENABLED: &str = "isMusicEnabled";
    pub const IS_LOCKED: &str = "isLocked";
}

/// Durable key/value preferences shared by the session components
pub trait PreferenceStore: Send + Sync {
    fn get_scalar(&self, key: &str) -> Option<String>;

    fn set_scalar(&self, key: &str, value: &str);

    fn get_json(&self, key: &str) -> Option<Value>;

    fn set_json(&self, key: &str, value: &Value);

    /// Remove everything except the music preference
    fn clear_all(&self);

    /// Read a boolean scalar, falling back to `default` when missing
    fn get_flag(&self, key: &str, default: bool) -> bool {
        match self.get_scalar(key) {
            Some(value) => value == "true",
            None => default,
        }
    }

    fn set_flag(&self, key: &str, value: bool) {
        self.set_scalar(key, if value { "true" } else { "false" });
    }
}

/// Keep only the music preference from a full map
fn retain_preserved(entries: &mut BTreeMap<String, Value>) {
    entries.retain(|key, _| key == keys::MUSIC_ENABLED);
}

fn scalar_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// In-memory store, used for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for MemoryStore {
    fn get_scalar(&self, key: &str) -> Option<String> {
        self.entries().get(key).map(scalar_of)
    }

    fn set_scalar(&self, key: &str, value: &str) {
        self.entries()
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    fn get_json(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    fn set_json(&self, key: &str, value: &Value) {
        self.entries().insert(key.to_string(), value.clone());
    }

    fn clear_all(&self) {
        retain_preserved(&mut self.entries());
    }
}

/// JSON file store; the whole map is rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preference directory: {}", parent.display())
            })?;
        }

        let entries = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse preferences: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened preference store at {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush(&self, entries: &BTreeMap<String, Value>) {
        let result = serde_json::to_string_pretty(entries)
            .context("Failed to serialize preferences")
            .and_then(|content| {
                fs::write(&self.path, content).with_context(|| {
                    format!("Failed to write preferences: {}", self.path.display())
                })
            });

        if let Err(e) = result {
            warn!("{:#}", e);
        }
    }

    fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut BTreeMap<String, Value>),
    {
        let mut entries = self.entries();
        updater(&mut entries);
        self.flush(&entries);
    }
}

impl PreferenceStore for FileStore {
    fn get_scalar(&self, key: &str) -> Option<String> {
        self.entries().get(key).map(scalar_of)
    }

    fn set_scalar(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        });
    }

    fn get_json(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    fn set_json(&self, key: &str, value: &Value) {
        self.update(|entries| {
            entries.insert(key.to_string(), value.clone());
        });
    }

    fn clear_all(&self) {
        self.update(retain_preserved);
    }
}
