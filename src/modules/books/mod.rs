pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, Module};
use serde_json::json;

use handlers::BooksState;
use store::SharedBookStore;

pub const MODULE_NAME: &str = "books";

/// Book catalog: CRUD, pagination and availability over a [`store::BookStore`]
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: SharedBookStore, settings: &Settings) -> Self {
        let base_path = format!("{}/{}", settings.server.api_prefix, MODULE_NAME);
        Self {
            state: BooksState {
                store,
                pagination: settings.pagination,
                base_path: base_path.into(),
            },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.state.store.prepare().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let book_envelope = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookEnvelope" } } }
            })
        };
        let id_param = json!({
            "name": "id", "in": "path", "required": true, "schema": { "type": "string" }
        });
        let book_body = |schema: &str| {
            json!({
                "required": true,
                "content": { "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } } }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Retrieve all books with pagination",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "A page of books",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookListEnvelope" } } }
                            },
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Add a new book to the library",
                        "tags": ["Books"],
                        "requestBody": book_body("CreateBook"),
                        "responses": {
                            "201": book_envelope("Book created"),
                            "400": error("Validation failed")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get details of a specific book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": book_envelope("The book"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update details of an existing book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": book_body("UpdateBook"),
                        "responses": {
                            "200": book_envelope("Book updated"),
                            "400": error("Validation failed"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Remove a book from the library",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": { "description": "Book deleted, data is null" },
                            "404": error("Book not found")
                        }
                    }
                },
                "/{id}/availability": {
                    "patch": {
                        "summary": "Mark a book available or unavailable",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "available": { "type": "boolean" } },
                                "required": ["available"]
                            } } }
                        },
                        "responses": {
                            "200": book_envelope("Availability updated"),
                            "400": error("available is not a boolean"),
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "publicationDate": { "type": "string", "format": "date" },
                            "edition": { "type": "string" },
                            "summary": { "type": "string" },
                            "available": { "type": "boolean" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "author", "genre", "publicationDate", "available", "createdAt", "updatedAt"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "publicationDate": { "type": "string", "format": "date" },
                            "edition": { "type": "string" },
                            "summary": { "type": "string" },
                            "available": { "type": "boolean" }
                        },
                        "required": ["title", "author", "genre", "publicationDate"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "publicationDate": { "type": "string", "format": "date" },
                            "edition": { "type": ["string", "null"] },
                            "summary": { "type": ["string", "null"] },
                            "available": { "type": "boolean" }
                        }
                    },
                    "BookEnvelope": {
                        "type": "object",
                        "properties": {
                            "status": { "type": "string" },
                            "code": { "type": "integer" },
                            "message": { "type": "string" },
                            "data": {
                                "type": "object",
                                "properties": { "book": { "$ref": "#/components/schemas/Book" } }
                            }
                        }
                    },
                    "BookListEnvelope": {
                        "type": "object",
                        "properties": {
                            "status": { "type": "string" },
                            "code": { "type": "integer" },
                            "message": { "type": "string" },
                            "data": {
                                "type": "object",
                                "properties": {
                                    "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                                    "pagination": {
                                        "type": "object",
                                        "properties": {
                                            "current_page": { "type": "integer" },
                                            "per_page": { "type": "integer" },
                                            "total_pages": { "type": "integer" },
                                            "total_books": { "type": "integer" }
                                        }
                                    }
                                }
                            },
                            "links": {
                                "type": "object",
                                "properties": {
                                    "self": { "type": "string" },
                                    "next": { "type": ["string", "null"] },
                                    "prev": { "type": ["string", "null"] }
                                }
                            }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), base_path = %self.state.base_path, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: SharedBookStore, settings: &Settings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, settings))
}
