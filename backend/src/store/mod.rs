//! Task persistence.
//!
//! [`TaskStore`] is the contract the API layer talks to. Inputs are the
//! validated [`NewTask`] and [`TaskPatch`] types, so a record with a blank
//! title can never reach a backend. Updates are last-write-wins; there is no
//! version token.

use async_trait::async_trait;
use shared::{NewTask, Task, TaskPatch};
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod redis_store;

pub use memory::InMemoryTaskStore;
pub use redis_store::RedisTaskStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(Uuid),

    #[error("store backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("task document could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every stored task, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<Task>, StoreError>;

    /// Stores a new task with a fresh id, both timestamps set to now and
    /// `is_completed` false.
    async fn insert(&self, new_task: NewTask) -> Result<Task, StoreError>;

    /// Merges `patch` into the task and refreshes `updated_at`.
    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Round-trips to the backend without touching any task.
    async fn ping(&self) -> Result<(), StoreError>;
}

fn newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
