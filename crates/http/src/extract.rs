//! Extractors that reject with the error envelope instead of axum's plain text.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use serde_json::json;

use crate::error::AppError;

/// `axum::Json` whose rejection is an [`AppError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::with_status(
                rejection.status(),
                "Invalid request body",
                json!({ "details": rejection.body_text() }),
            )),
        }
    }
}
