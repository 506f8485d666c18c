pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::SharedBookRepository;

/// Books module: the CRUD endpoints and the `books` table
pub struct BooksModule {
    repository: SharedBookRepository,
}

impl BooksModule {
    pub fn new(repository: SharedBookRepository) -> Self {
        Self { repository }
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
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id         BIGSERIAL   PRIMARY KEY,
                    author     TEXT,
                    title      TEXT,
                    publisher  TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    deleted_at TIMESTAMPTZ
                );
                CREATE INDEX IF NOT EXISTS idx_books_deleted_at ON books (deleted_at);
                "#,
        }]
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

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "data": data
        },
        "required": ["message"]
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let book_ref = json!({ "$ref": "#/components/schemas/Book" });

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Books fetched successfully",
                            "content": { "application/json": { "schema": envelope(json!({
                                "type": "array",
                                "items": book_ref
                            })) } }
                        },
                        "400": error_response("Could not get books")
                    }
                }
            },
            "/get_book/{id}": {
                "get": {
                    "summary": "Get a book by id",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": {
                            "description": "Book fetched successfully; data is null when no book has the id",
                            "content": { "application/json": { "schema": envelope(book_ref.clone()) } }
                        },
                        "400": error_response("Could not get book with id"),
                        "500": error_response("ID is required")
                    }
                }
            },
            "/create_book": {
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateBook" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Book added",
                            "content": { "application/json": { "schema": envelope(json!({})) } }
                        },
                        "400": error_response("Could not create book"),
                        "422": error_response("Request failed")
                    }
                }
            },
            "/delete_book/{id}": {
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": {
                            "description": "Book deleted successfully; data is null when no book had the id",
                            "content": { "application/json": { "schema": envelope(book_ref) } }
                        },
                        "400": error_response("Could not delete book"),
                        "500": error_response("ID is required")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "author": { "type": "string", "nullable": true },
                        "title": { "type": "string", "nullable": true },
                        "publisher": { "type": "string", "nullable": true },
                        "created_at": { "type": "string", "format": "date-time" },
                        "updated_at": { "type": "string", "format": "date-time" },
                        "deleted_at": { "type": "string", "format": "date-time", "nullable": true }
                    },
                    "required": ["id", "created_at", "updated_at"]
                },
                "CreateBook": {
                    "type": "object",
                    "description": "Omitted or null fields are stored as empty strings",
                    "properties": {
                        "author": { "type": "string", "nullable": true },
                        "title": { "type": "string", "nullable": true },
                        "publisher": { "type": "string", "nullable": true }
                    }
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(repository: SharedBookRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(repository))
}
