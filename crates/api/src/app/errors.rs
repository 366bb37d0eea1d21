//! The JSON envelope every endpoint answers with, and the error taxonomy
//! that maps onto it.
//!
//! Success: `{"success": true, "data": ..., "message"?: "..."}`.
//! Failure: `{"success": false, "error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use storefront_auth::AuthzError;
use storefront_core::DomainError;
use storefront_infra::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (
            status,
            axum::Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvariantViolation(msg) | DomainError::Conflict(msg) => {
                ApiError::Validation(msg)
            }
            DomainError::InvalidId(msg) => ApiError::Validation(format!("Invalid id: {msg}")),
            DomainError::NotFound => ApiError::NotFound("Not found".to_string()),
            DomainError::Unauthorized => ApiError::Forbidden("Forbidden".to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Not found".to_string()),
            StoreError::Storage(msg) => ApiError::Internal(msg),
            StoreError::Corrupt(msg) => ApiError::Internal(format!("corrupt row: {msg}")),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("failed to encode response: {err}"))
    }
}

/// A successful envelope.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    data: Value,
    message: Option<String>,
}

pub type ApiResult = Result<ApiResponse, ApiError>;

impl ApiResponse {
    pub fn ok(data: impl Serialize) -> ApiResult {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: impl Serialize) -> ApiResult {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: impl Serialize) -> ApiResult {
        Ok(Self {
            status,
            data: serde_json::to_value(data)?,
            message: None,
        })
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": true,
            "data": self.data,
        });
        if let Some(message) = self.message {
            body["message"] = Value::String(message);
        }
        (self.status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_errors() {
        assert_eq!(
            ApiError::from(DomainError::conflict("Question already answered")),
            ApiError::Validation("Question already answered".into())
        );
        assert_eq!(ApiError::from(DomainError::not_found()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_failures_are_internal_and_keep_the_message() {
        let err = ApiError::from(StoreError::Storage("connection reset".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn message_is_attached_only_when_set() {
        let r = ApiResponse::created(json!({"id": 1})).unwrap().message("Created");
        assert_eq!(r.status, StatusCode::CREATED);
        assert_eq!(r.message.as_deref(), Some("Created"));
        assert_eq!(ApiResponse::ok(()).unwrap().data, Value::Null);
    }
}
