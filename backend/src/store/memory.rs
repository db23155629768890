use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shared::{NewTask, Task, TaskPatch};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{newest_first, StoreError, TaskStore};

/// Process-local store. Contents are lost on restart; used by the tests and
/// by `TASK_STORE=memory`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let task = Task::new(new_task, Utc::now());
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        task.apply(patch, Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
