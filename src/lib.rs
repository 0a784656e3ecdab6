// Tasklist - task list state with pluggable local persistence

pub mod events;
pub mod filter;
pub mod fs_kv;
pub mod kv;
pub mod models;
pub mod snapshot;
pub mod sqlite_kv;
pub mod store;

// Re-export main types for convenience
pub use events::{StoreEvent, SubscriptionId};
pub use filter::{SearchField, SearchFilter, filter_tasks};
pub use fs_kv::FileKv;
pub use kv::{KvStore, MemKv};
pub use models::{EditState, Task, TaskForm};
pub use snapshot::TASKS_KEY;
pub use sqlite_kv::SqliteKv;
pub use store::{SubmitOutcome, TaskStore};
