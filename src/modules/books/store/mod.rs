//! Persistence for book records.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use bookshelf_http::AppError;
use thiserror::Error;

use super::models::{Book, BookPatch, NewBook};
use super::validation::{BookField, FieldErrors};
use crate::utils::pagination::PageRequest;

mod memory;
mod mongo;

pub use memory::InMemoryBookStore;
pub use mongo::{BookDocument, MongoBookStore, COLLECTION};

pub type SharedBookStore = Arc<dyn BookStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record would violate a storage-level constraint
    #[error("book record rejected: {0}")]
    Constraint(FieldErrors),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl StoreError {
    /// Status carried by the failure
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::Constraint(_) => StatusCode::BAD_REQUEST,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(errors) => AppError::Validation {
                message: "Validation failed".to_string(),
                errors: serde_json::to_value(errors).unwrap_or_default(),
            },
            other @ StoreError::Database(_) => AppError::Internal(other.into()),
        }
    }
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// One-time setup run when the module initializes
    async fn prepare(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Newest first. Returns the page and the count of all books.
    async fn list_page(&self, page: PageRequest) -> Result<(Vec<Book>, u64), StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    async fn create(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Merge `patch` into the record; `None` when no record has `id`
    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError>;

    async fn set_availability(&self, id: &str, available: bool) -> Result<Option<Book>, StoreError> {
        self.update(id, BookPatch::availability(available)).await
    }

    /// `true` when a record existed and was removed
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Trim stored text and reject blank mandatory fields.
fn normalize_required(field: BookField, value: &mut String, errors: &mut FieldErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field.key(), field.required_message());
    }
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn normalize_optional(value: &mut Option<String>) {
    if let Some(text) = value {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
}

impl NewBook {
    /// Storage-level constraints, enforced whether or not the request was validated
    pub(crate) fn normalized(mut self) -> Result<Self, StoreError> {
        let mut errors = FieldErrors::new();
        normalize_required(BookField::Title, &mut self.title, &mut errors);
        normalize_required(BookField::Author, &mut self.author, &mut errors);
        normalize_required(BookField::Genre, &mut self.genre, &mut errors);
        normalize_optional(&mut self.edition);
        normalize_optional(&mut self.summary);
        errors.into_result(self).map_err(StoreError::Constraint)
    }
}

impl BookPatch {
    /// Stored records always satisfy the constraints, so checking the supplied
    /// fields is the same as checking the merged record.
    pub(crate) fn normalized(mut self) -> Result<Self, StoreError> {
        let mut errors = FieldErrors::new();
        let required = [
            (BookField::Title, &mut self.title),
            (BookField::Author, &mut self.author),
            (BookField::Genre, &mut self.genre),
        ];
        for (field, value) in required {
            if let Some(value) = value {
                normalize_required(field, value, &mut errors);
            }
        }
        for value in [&mut self.edition, &mut self.summary].into_iter().flatten() {
            normalize_optional(value);
        }
        errors.into_result(self).map_err(StoreError::Constraint)
    }
}
