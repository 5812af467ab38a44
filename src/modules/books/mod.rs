pub mod errors;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use errors::{BookError, ErrorKind};
pub use service::BookService;
pub use store::{BookStore, MemoryBookStore, PgBookStore, StoreError};

/// Books module: CRUD over soft-deletable book records
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            service: BookService::new(store),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id         BIGSERIAL    PRIMARY KEY,
                    title      VARCHAR(255) NOT NULL,
                    author     VARCHAR(255) NOT NULL,
                    created_at TIMESTAMPTZ  NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ  NOT NULL DEFAULT now(),
                    deleted_at TIMESTAMPTZ  NULL
                );
                CREATE INDEX IF NOT EXISTS idx_books_deleted_at ON books (deleted_at);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn envelope_response(description: &str, data_schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "data": data_schema
                    },
                    "required": ["message"]
                }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Book ID (decimal digits)",
        "schema": { "type": "string", "pattern": "^[0-9]+$" }
    })
}

fn request_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let book_ref = json!({ "$ref": "#/components/schemas/Book" });
    let text_field = |description: &str| {
        json!({
            "type": "string",
            "minLength": 1,
            "maxLength": 255,
            "description": description
        })
    };

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": envelope_response(
                            "Books retrieved successfully",
                            json!({ "type": "array", "items": book_ref.clone() })
                        ),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a new book",
                    "tags": ["Books"],
                    "requestBody": request_body("CreateBookRequest"),
                    "responses": {
                        "201": envelope_response("Book created successfully", book_ref.clone()),
                        "400": error_response("Invalid payload"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get book by ID",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": envelope_response("Book retrieved successfully", book_ref.clone()),
                        "400": error_response("Invalid book ID"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "put": {
                    "summary": "Update book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": request_body("UpdateBookRequest"),
                    "responses": {
                        "200": envelope_response("Book updated successfully", book_ref),
                        "400": error_response("Invalid book ID or payload"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": envelope_response("Book deleted successfully", json!({ "type": "null" })),
                        "400": error_response("Invalid book ID"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64", "description": "Unique identifier for the book" },
                        "title": { "type": "string", "description": "Sanitized title of the book" },
                        "author": { "type": "string", "description": "Sanitized author of the book" },
                        "created_at": { "type": "string", "format": "date-time" },
                        "updated_at": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "title", "author", "created_at", "updated_at"]
                },
                "CreateBookRequest": {
                    "type": "object",
                    "properties": {
                        "title": text_field("Title of the book"),
                        "author": text_field("Author of the book")
                    },
                    "required": ["title", "author"]
                },
                "UpdateBookRequest": {
                    "type": "object",
                    "properties": {
                        "title": text_field("New title of the book"),
                        "author": text_field("New author of the book")
                    },
                    "required": ["title", "author"]
                }
            }
        }
    })
}

/// Create the books module over the given store
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
