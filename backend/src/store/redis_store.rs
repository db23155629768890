//! Redis-backed document store.
//!
//! - `task:{id}` holds the task as a JSON document
//! - `tasks:index` is a sorted set of ids scored by `created_at` millis

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client};
use shared::{NewTask, Task, TaskPatch};
use uuid::Uuid;

use super::{newest_first, StoreError, TaskStore};

const TASK_KEY_PREFIX: &str = "task:";
const TASK_INDEX_KEY: &str = "tasks:index";

fn task_key(id: &str) -> String {
    format!("{TASK_KEY_PREFIX}{id}")
}

#[derive(Debug, Clone)]
pub struct RedisTaskStore {
    client: Arc<Client>,
}

impl RedisTaskStore {
    /// Parses the connection string. No connection is made until the first
    /// operation.
    pub fn open(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn connection(&self) -> Result<redis::aio::Connection, StoreError> {
        Ok(self.client.get_async_connection().await?)
    }
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let mut conn = self.connection().await?;

        let ids: Vec<String> = conn.zrevrange(TASK_INDEX_KEY, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| task_key(id)).collect();
        let documents: Vec<Option<String>> =
            redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        // An index entry without a document was deleted between the two reads.
        let mut tasks = documents
            .into_iter()
            .flatten()
            .map(|json| serde_json::from_str::<Task>(&json))
            .collect::<Result<Vec<_>, _>>()?;
        newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let task = Task::new(new_task, Utc::now());
        let id = task.id.to_string();
        let json = serde_json::to_string(&task)?;

        let mut conn = self.connection().await?;
        redis::pipe()
            .atomic()
            .set(task_key(&id), json)
            .ignore()
            .zadd(TASK_INDEX_KEY, &id, task.created_at.timestamp_millis())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(task)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, StoreError> {
        let key = task_key(&id.to_string());
        let mut conn = self.connection().await?;

        let json: Option<String> = conn.get(&key).await?;
        let mut task: Task = match json {
            Some(json) => serde_json::from_str(&json)?,
            None => return Err(StoreError::NotFound(id)),
        };
        task.apply(patch, Utc::now());

        // XX: never recreate a document that was deleted after the read.
        let written: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(serde_json::to_string(&task)?)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        if written.is_none() {
            return Err(StoreError::NotFound(id));
        }

        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let id_string = id.to_string();
        let mut conn = self.connection().await?;

        let (removed, _): (usize, usize) = redis::pipe()
            .atomic()
            .del(task_key(&id_string))
            .zrem(TASK_INDEX_KEY, &id_string)
            .query_async(&mut conn)
            .await?;

        if removed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REDIS_URL;
    use std::time::Duration;

    fn store() -> RedisTaskStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        RedisTaskStore::open(&url).unwrap()
    }

    fn new_task(title: &str) -> NewTask {
        NewTask::new(title, Some("Testing")).unwrap()
    }

    /// Positions of `ids` in the full listing. Other tests share the server,
    /// so only the relative order of our own records is checked.
    async fn positions(store: &RedisTaskStore, ids: &[Uuid]) -> Vec<Option<usize>> {
        let listed = store.list_all().await.unwrap();
        ids.iter()
            .map(|id| listed.iter().position(|t| t.id == *id))
            .collect()
    }

    #[test]
    fn keys_are_prefixed() {
        let id = Uuid::nil().to_string();
        assert_eq!(task_key(&id), "task:00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn open_rejects_malformed_url() {
        assert!(matches!(
            RedisTaskStore::open("not a url"),
            Err(StoreError::Backend(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn insert_then_list_contains_the_task() {
        let store = store();
        let task = store.insert(new_task("Test Task")).await.unwrap();

        assert_eq!(task.title, "Test Task");
        assert!(!task.is_completed);
        assert_eq!(task.created_at, task.updated_at);

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.iter().filter(|t| **t == task).count(), 1);

        store.delete(task.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn list_is_newest_first() {
        let store = store();
        let older = store.insert(new_task("older")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newer = store.insert(new_task("newer")).await.unwrap();

        let found = positions(&store, &[newer.id, older.id]).await;
        match found.as_slice() {
            [Some(newer_at), Some(older_at)] => assert!(newer_at < older_at),
            _ => panic!("inserted tasks missing from list: {found:?}"),
        }

        store.delete(older.id).await.unwrap();
        store.delete(newer.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn update_merges_and_advances_updated_at() {
        let store = store();
        let task = store.insert(new_task("Test Task")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = store
            .update(task.id, TaskPatch::completion(true))
            .await
            .unwrap();

        assert!(updated.is_completed);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.description, task.description);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);

        let listed = store.list_all().await.unwrap();
        assert!(listed.contains(&updated));

        store.delete(task.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn update_unknown_id_is_not_found() {
        let store = store();
        let id = Uuid::new_v4();

        let result = store.update(id, TaskPatch::completion(true)).await;

        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
        let mut conn = store.connection().await.unwrap();
        let exists: bool = conn.exists(task_key(&id.to_string())).await.unwrap();
        assert!(!exists);
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn delete_removes_document_and_index_entry() {
        let store = store();
        let task = store.insert(new_task("gone")).await.unwrap();
        let id = task.id.to_string();

        store.delete(task.id).await.unwrap();

        let mut conn = store.connection().await.unwrap();
        let exists: bool = conn.exists(task_key(&id)).await.unwrap();
        let score: Option<f64> = conn.zscore(TASK_INDEX_KEY, &id).await.unwrap();
        assert!(!exists);
        assert_eq!(score, None);
        assert_eq!(positions(&store, &[task.id]).await, vec![None]);

        assert!(matches!(
            store.delete(task.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn update_after_delete_stays_deleted() {
        let store = store();
        let task = store.insert(new_task("gone")).await.unwrap();
        store.delete(task.id).await.unwrap();

        let result = store.update(task.id, TaskPatch::completion(true)).await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(positions(&store, &[task.id]).await, vec![None]);
        let mut conn = store.connection().await.unwrap();
        let exists: bool = conn.exists(task_key(&task.id.to_string())).await.unwrap();
        assert!(!exists);
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn list_skips_index_entries_without_a_document() {
        let store = store();
        let orphan = store.insert(new_task("orphan")).await.unwrap();
        let kept = store.insert(new_task("kept")).await.unwrap();

        let mut conn = store.connection().await.unwrap();
        let _: usize = conn.del(task_key(&orphan.id.to_string())).await.unwrap();

        assert_eq!(positions(&store, &[orphan.id]).await, vec![None]);
        assert!(store.list_all().await.unwrap().contains(&kept));

        let _: usize = conn.zrem(TASK_INDEX_KEY, orphan.id.to_string()).await.unwrap();
        store.delete(kept.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn ping_answers() {
        store().ping().await.unwrap();
    }
}
