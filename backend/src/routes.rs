use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.list_all().await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = payload?;
    let new_task = request.validate()?;

    let task = state.store.insert(new_task).await?;
    tracing::info!(task_id = %task.id, "task created");

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_task_id(&id)?;
    let Json(request) = payload?;
    let patch = request.validate()?;

    let task = state.store.update(id, patch).await?;
    tracing::info!(task_id = %task.id, is_completed = task.is_completed, "task updated");

    Ok(Json(task))
}

pub async fn delete_task(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_task_id(&id)?;

    state.store.delete(id).await?;
    tracing::info!(task_id = %id, "task deleted");

    Ok(Json(json!({"message": "Task deleted successfully"})))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(error) => {
            tracing::warn!(%error, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable"})),
            )
        }
    }
}

// Anything that is not a UUID cannot name a stored task.
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Task not found"))
}
