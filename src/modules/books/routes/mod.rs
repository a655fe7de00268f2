use axum::{
    routing::{get, patch},
    Router,
};

use super::handlers::{self, BooksState};

/// Route table for the books module, relative to its mount path.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(handlers::list_books).post(handlers::create_book))
        .route("/health", get(handlers::health_check))
        .route(
            "/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route("/{id}/availability", patch(handlers::update_availability))
        .with_state(state)
}
