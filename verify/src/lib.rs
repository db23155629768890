//! End-to-end smoke test for a running Task Master API.
//!
//! Creates a task, checks it is listed, completes it, deletes it and checks it
//! is gone. The first unexpected status or missing/extra record stops the run.

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/tasks";

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("{0}")]
    Check(String),
}

pub struct Verifier {
    client: Client,
    base_url: String,
}

impl Verifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn run(&self) -> Result<(), VerifyError> {
        tracing::info!("1. Creating Task...");
        let request = CreateTaskRequest {
            title: "Test Task".to_string(),
            description: Some("Testing".to_string()),
        };
        let task: Task = self.send(Method::POST, "", Some(&request)).await?;
        tracing::info!(task_id = %task.id, "Created");

        tracing::info!("2. Fetching Tasks...");
        let listed = self.occurrences(task.id).await?;
        if listed != 1 {
            return Err(VerifyError::Check(format!(
                "expected task {} once in list, found {listed}",
                task.id
            )));
        }
        tracing::info!("Task found in list.");

        tracing::info!("3. Updating Task...");
        let update = UpdateTaskRequest {
            is_completed: Some(true),
            ..UpdateTaskRequest::default()
        };
        let updated: Task = self
            .send(Method::PUT, &format!("/{}", task.id), Some(&update))
            .await?;
        if !updated.is_completed {
            return Err(VerifyError::Check("Task not updated".to_string()));
        }
        tracing::info!("Task updated (completed).");

        tracing::info!("4. Deleting Task...");
        let _: Value = self
            .send(Method::DELETE, &format!("/{}", task.id), None::<&()>)
            .await?;
        tracing::info!("Task deleted.");

        tracing::info!("5. Verifying Deletion...");
        if self.occurrences(task.id).await? != 0 {
            return Err(VerifyError::Check("Task still exists".to_string()));
        }
        tracing::info!("Deletion verified.");

        Ok(())
    }

    async fn occurrences(&self, id: Uuid) -> Result<usize, VerifyError> {
        let tasks: Vec<Task> = self.send(Method::GET, "", None::<&()>).await?;
        Ok(tasks.iter().filter(|t| t.id == id).count())
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, VerifyError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(VerifyError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = if text.is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }
}
