//! Platform collaborators of the focus session
//!
//! Preference storage, the task list and the client-side effect adapters for
//! audio, notifications and the viewport.

pub mod audio;
pub mod notifications;
pub mod storage;
pub mod todos;
pub mod viewport;

// Re-export main types
pub use audio::{AmbientAudio, ClientAudio};
pub use notifications::{ClientNotifications, NotificationSuppressor};
pub use storage::{FileStore, MemoryStore, PreferenceStore};
pub use todos::{SharedTasks, Task, TaskList, TaskProvider};
pub use viewport::ClientViewport;
