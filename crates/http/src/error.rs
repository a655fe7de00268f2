//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub code: u16,
    pub message: String,
    pub errors: Value,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>, errors: Value) -> Self {
        Self {
            status: "error",
            code: status.as_u16(),
            message: message.into(),
            errors,
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String, errors: Value },

    #[error("not found: {message}")]
    NotFound { message: String, details: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, errors: Value },

    /// A failure that carries its own status code
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: String,
        errors: Value,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Field-level validation failure
    pub fn validation(errors: impl Serialize) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            errors: serde_json::to_value(errors).unwrap_or(Value::Null),
        }
    }

    /// Resource lookup failure with a fixed human-readable detail
    pub fn not_found(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            errors: json!({ "details": details.into() }),
        }
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, errors: Value) -> Self {
        Self::Status {
            status,
            message: message.into(),
            errors,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Status { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = ?self,
                "request failed"
            );
        } else {
            tracing::debug!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request rejected"
            );
        }

        let (message, errors) = match self {
            AppError::Validation { message, errors }
            | AppError::BadRequest { message, errors }
            | AppError::Status {
                message, errors, ..
            } => (message, errors),
            AppError::NotFound { message, details } => (message, json!({ "details": details })),
            AppError::Internal(e) => {
                // Release builds never leak driver or internal error text
                let message = if cfg!(debug_assertions) {
                    e.to_string()
                } else {
                    "Internal Server Error".to_string()
                };
                (message, json!({ "error_id": error_id.to_string() }))
            }
        };

        ErrorBody::new(status, message, errors).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error() {
        let errors = json!({ "title": "Title is required" });
        let error = AppError::validation(errors.clone());

        match error {
            AppError::Validation { errors: e, message } => {
                assert_eq!(e, errors);
                assert_eq!(message, "Validation failed");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::not_found("Book not found", "gone").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "Book not found");
        assert_eq!(body["errors"]["details"], "gone");
    }

    #[tokio::test]
    async fn test_carried_status_is_used() {
        let response = AppError::with_status(StatusCode::CONFLICT, "taken", json!({}))
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["code"], 409);
        assert_eq!(body["message"], "taken");
    }

    #[tokio::test]
    async fn test_internal_error_mapping() {
        let internal_error = anyhow::anyhow!("Database connection failed");
        let response = AppError::Internal(internal_error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 500);
        assert!(body["errors"]["error_id"].is_string());
    }

    #[tokio::test]
    async fn test_bad_request_details() {
        let response = AppError::bad_request("Validation failed", "must be a boolean")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["errors"]["details"], "must be a boolean");
    }
}
