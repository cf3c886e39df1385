//! Task list and the task provider contract used by the orchestrator

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::storage::{keys, PreferenceStore};
use crate::state::TaskId;

/// What the session orchestrator needs from the task list
pub trait TaskProvider: Send {
    /// First task in list order that is not completed
    fn find_next_incomplete(&self) -> Option<TaskId>;

    fn mark_complete(&mut self, task: TaskId);

    /// Title shown on the timer overlay, `None` for unknown tasks
    fn display_title(&self, task: TaskId) -> Option<String>;
}

/// A single todo item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Ordered task list persisted under the `todos` key
pub struct TaskList {
    tasks: Vec<Task>,
    store: Arc<dyn PreferenceStore>,
}

impl TaskList {
    /// Load the task list from the store, starting empty on missing or bad data
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let tasks = match store.get_json(keys::TODOS) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding unreadable task list: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        Self { tasks, store }
    }

    /// Re-read the list after the store was changed underneath it
    pub fn reload(&mut self) {
        *self = Self::load(Arc::clone(&self.store));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Append a task and persist the list
    pub fn add(&mut self, title: &str, completed: bool) -> Task {
        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = Task {
            id,
            title: title.trim().to_string(),
            completed,
            created_at: Utc::now(),
        };
        self.tasks.push(task.clone());
        self.save();
        task
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn save(&self) {
        match serde_json::to_value(&self.tasks) {
            Ok(value) => self.store.set_json(keys::TODOS, &value),
            Err(e) => warn!("Failed to serialize task list: {}", e),
        }
    }
}

impl TaskProvider for TaskList {
    fn find_next_incomplete(&self) -> Option<TaskId> {
        self.tasks.iter().find(|t| !t.completed).map(|t| t.id)
    }

    fn mark_complete(&mut self, task: TaskId) {
        if let Some(entry) = self.tasks.iter_mut().find(|t| t.id == task) {
            entry.completed = true;
            info!("Task {} completed: {}", entry.id, entry.title);
            self.save();
        }
    }

    fn display_title(&self, task: TaskId) -> Option<String> {
        self.get(task).map(|t| t.title.clone())
    }
}

/// Task list handle shared between the orchestrator and the HTTP handlers
#[derive(Clone)]
pub struct SharedTasks(Arc<Mutex<TaskList>>);

impl SharedTasks {
    pub fn new(list: TaskList) -> Self {
        Self(Arc::new(Mutex::new(list)))
    }

    pub fn lock(&self) -> MutexGuard<'_, TaskList> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TaskProvider for SharedTasks {
    fn find_next_incomplete(&self) -> Option<TaskId> {
        self.lock().find_next_incomplete()
    }

    fn mark_complete(&mut self, task: TaskId) {
        self.lock().mark_complete(task)
    }

    fn display_title(&self, task: TaskId) -> Option<String> {
        self.lock().display_title(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;

    #[test]
    fn test_next_incomplete_follows_list_order() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        let mut list = TaskList::load(store);
        let first = list.add("Read chapter", false);
        let second = list.add("Write notes", false);

        assert_eq!(list.find_next_incomplete(), Some(first.id));
        list.mark_complete(first.id);
        assert_eq!(list.find_next_incomplete(), Some(second.id));
        list.mark_complete(second.id);
        assert_eq!(list.find_next_incomplete(), None);
    }

    #[test]
    fn test_list_persists_through_store() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        let mut list = TaskList::load(Arc::clone(&store));
        let task = list.add("  Plan sprint ", false);
        list.mark_complete(task.id);

        let reloaded = TaskList::load(store);
        assert_eq!(reloaded.tasks().len(), 1);
        assert_eq!(reloaded.tasks()[0].title, "Plan sprint");
        assert!(reloaded.tasks()[0].completed);
    }

    #[test]
    fn test_unknown_task_has_no_title() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        let list = TaskList::load(store);
        assert_eq!(list.display_title(42), None);
    }
}
