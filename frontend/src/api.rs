//! Fetch client for `/api/tasks`.

use shared::{CreateTaskRequest, ErrorBody, Task, UpdateTaskRequest};
use thiserror::Error;
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const API_BASE: &str = "/api/tasks";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub async fn fetch_tasks() -> Result<Vec<Task>, ClientError> {
    let response = send("GET", API_BASE, None).await?;
    let text = ensure_ok(response, "Failed to fetch tasks").await?;
    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}

pub async fn create_task(request: CreateTaskRequest) -> Result<Task, ClientError> {
    let body = serde_json::to_string(&request).map_err(|e| ClientError::Decode(e.to_string()))?;
    let response = send("POST", API_BASE, Some(body)).await?;
    let text = ensure_ok(response, "Failed to create task").await?;
    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}

pub async fn update_task(id: Uuid, request: UpdateTaskRequest) -> Result<Task, ClientError> {
    let body = serde_json::to_string(&request).map_err(|e| ClientError::Decode(e.to_string()))?;
    let url = format!("{API_BASE}/{id}");
    let response = send("PUT", &url, Some(body)).await?;
    let text = ensure_ok(response, "Failed to update task").await?;
    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}

pub async fn delete_task(id: Uuid) -> Result<(), ClientError> {
    let url = format!("{API_BASE}/{id}");
    let response = send("DELETE", &url, None).await?;
    ensure_ok(response, "Failed to delete task").await?;
    Ok(())
}

async fn send(method: &str, url: &str, body: Option<String>) -> Result<Response, ClientError> {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::SameOrigin);
    if let Some(body) = &body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts).map_err(network_error)?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(network_error)?;
    }

    let window = web_sys::window().ok_or_else(|| ClientError::Network("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network_error)?;
    response
        .dyn_into::<Response>()
        .map_err(|_| ClientError::Decode("fetch did not return a Response".to_string()))
}

// Reads the body, turning a non-2xx status into `ClientError::Status` with the
// server's message when it sent one.
async fn ensure_ok(response: Response, fallback: &str) -> Result<String, ClientError> {
    let text_promise = response.text().map_err(network_error)?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(network_error)?
        .as_string()
        .unwrap_or_default();

    if response.ok() {
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| format!("{fallback}: {}", body.message))
        .unwrap_or_else(|_| fallback.to_string());
    Err(ClientError::Status {
        status: response.status(),
        message,
    })
}

fn network_error(value: JsValue) -> ClientError {
    ClientError::Network(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
