//! Book endpoints. Each handler runs validation, one store call, and shapes
//! the envelope; anything it cannot classify goes to `AppError`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
};
use bookshelf_http::{ApiJson, ApiResponse, AppError};
use bookshelf_kernel::settings::PaginationSettings;
use serde_json::Value;

use super::models::{BookListPayload, BookPayload, PaginationBlock};
use super::store::SharedBookStore;
use super::validation::{validate, ValidationRules};
use crate::utils::pagination::{PageParams, PageRequest};

const NOT_FOUND_MESSAGE: &str = "Book not found";
const NOT_FOUND_DETAILS: &str = "The requested book does not exist.";

/// Shared by every book handler
#[derive(Clone)]
pub struct BooksState {
    pub store: SharedBookStore,
    pub pagination: PaginationSettings,
    /// Public path of the collection, used to build pagination links
    pub base_path: Arc<str>,
}

fn book_not_found() -> AppError {
    AppError::not_found(NOT_FOUND_MESSAGE, NOT_FOUND_DETAILS)
}

pub async fn health_check() -> &'static str {
    "books module is healthy"
}

pub async fn list_books(
    State(state): State<BooksState>,
    Query(params): Query<PageParams>,
) -> Result<ApiResponse<BookListPayload>, AppError> {
    let page = PageRequest::from_params(&params, &state.pagination);
    let (books, total) = state.store.list_page(page).await?;

    let pagination = PaginationBlock {
        current_page: page.page,
        per_page: page.limit,
        total_pages: page.total_pages(total),
        total_books: total,
    };
    let links = page.links(&state.base_path, total);

    Ok(
        ApiResponse::ok(
            "Books retrieved successfully",
            BookListPayload { books, pagination },
        )
        .with_links(links),
    )
}

pub async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookPayload>, AppError> {
    let book = state.store.get_by_id(&id).await?.ok_or_else(book_not_found)?;
    Ok(ApiResponse::ok(
        "Book retrieved successfully",
        BookPayload { book },
    ))
}

pub async fn create_book(
    State(state): State<BooksState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ApiResponse<BookPayload>, AppError> {
    let new_book = validate(&body, &ValidationRules::CREATE)
        .and_then(|input| input.into_new_book())
        .map_err(AppError::validation)?;

    let book = state.store.create(new_book).await?;
    tracing::info!(book_id = %book.id, "book created");

    Ok(ApiResponse::created(
        "Book created successfully",
        BookPayload { book },
    ))
}

pub async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ApiResponse<BookPayload>, AppError> {
    let patch = validate(&body, &ValidationRules::UPDATE)
        .map_err(AppError::validation)?
        .into_patch();

    let book = state
        .store
        .update(&id, patch)
        .await?
        .ok_or_else(book_not_found)?;
    tracing::info!(book_id = %book.id, "book updated");

    Ok(ApiResponse::ok(
        "Book updated successfully",
        BookPayload { book },
    ))
}

pub async fn update_availability(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse<BookPayload>, AppError> {
    // Missing, non-JSON and non-boolean bodies all get the same 400
    let body = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let Some(available) = body.get("available").and_then(Value::as_bool) else {
        return Err(AppError::bad_request(
            "Validation failed",
            "The 'available' field must be a boolean value.",
        ));
    };

    let book = state
        .store
        .set_availability(&id, available)
        .await?
        .ok_or_else(book_not_found)?;
    tracing::info!(book_id = %book.id, available, "book availability changed");

    Ok(ApiResponse::ok(
        "Book availability updated successfully",
        BookPayload { book },
    ))
}

pub async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    if !state.store.delete(&id).await? {
        return Err(book_not_found());
    }
    tracing::info!(book_id = %id, "book deleted");

    Ok(ApiResponse::ok("Book deleted successfully", ()))
}
