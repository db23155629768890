//! HTTP error mapping.
//!
//! Validation failures and malformed bodies become 400, unknown ids 404, and
//! every other store failure a generic 500. Store details are logged rather
//! than sent to the client.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorBody, FieldError, ValidationError};

use crate::store::StoreError;

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        let mut api_error = Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", error.to_string());
        api_error.body.details = Some(vec![FieldError::from(&error)]);
        api_error
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => {
                tracing::debug!(task_id = %id, "task not found");
                Self::not_found("Task not found")
            }
            StoreError::Backend(_) | StoreError::Serialization(_) => {
                tracing::error!(%error, "store operation failed");
                Self::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn validation_error_carries_field_details() {
        let error = ApiError::from(ValidationError::BlankTitle);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.body().code, "VALIDATION_ERROR");
        let details = error.body().details.as_ref().unwrap();
        assert_eq!(details[0].field, "title");
    }

    #[test]
    fn store_errors_map_to_status_codes() {
        let missing = ApiError::from(StoreError::NotFound(Uuid::new_v4()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let backend = ApiError::from(StoreError::Backend(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        ))));
        assert_eq!(backend.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(backend.body().message, "An internal error occurred");
    }
}
