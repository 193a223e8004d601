pub mod errors;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use errors::BooksError;
pub use store::{BookStore, InMemoryBookStore, SqliteBookStore};

const CREATE_BOOKS_TABLE_SQL: &str = include_str!("sql/create_books_table.sql");

/// Books module: CRUD over the `books` table with filtered listing
pub struct BooksModule {
    store: Arc<dyn BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Schema statements for the `books` table
    pub fn schema() -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: CREATE_BOOKS_TABLE_SQL,
        }]
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
        routes::router(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        Self::schema()
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

/// Create a new instance of the books module over the given store
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
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

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn book_input_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

fn query_parameter(name: &str, schema: serde_json::Value, description: &str) -> serde_json::Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": schema
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/books/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        query_parameter("author", json!({ "type": "string" }), "Exact author match"),
                        query_parameter("genre", json!({ "type": "string" }), "Exact genre match"),
                        query_parameter(
                            "price_lt",
                            json!({ "type": "number" }),
                            "Only books cheaper than this; 0 means no limit"
                        ),
                        query_parameter(
                            "search",
                            json!({ "type": "string" }),
                            "Case-insensitive substring of title, author or genre"
                        )
                    ],
                    "responses": {
                        "200": {
                            "description": "Matching books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "422": error_response("Malformed query parameters")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_input_body(),
                    "responses": {
                        "201": book_response("Created book"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": book_input_body(),
                    "responses": {
                        "200": book_response("Updated book"),
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "404": error_response("Book not found")
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
                        "title": { "type": "string", "minLength": 2, "maxLength": 100 },
                        "author": { "type": "string", "minLength": 2, "maxLength": 50 },
                        "genre": { "type": ["string", "null"], "maxLength": 30 },
                        "price": { "type": "number", "exclusiveMinimum": 0 },
                        "quantity": { "type": "integer", "format": "int64", "minimum": 0 }
                    },
                    "required": ["id", "title", "author", "genre", "price", "quantity"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 2, "maxLength": 100 },
                        "author": { "type": "string", "minLength": 2, "maxLength": 50 },
                        "genre": { "type": ["string", "null"], "maxLength": 30 },
                        "price": { "type": "number", "exclusiveMinimum": 0 },
                        "quantity": { "type": "integer", "format": "int64", "minimum": 0 }
                    },
                    "required": ["title", "author", "price", "quantity"]
                },
                "ValidationDetail": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "error": { "type": "string" },
                        "message": { "type": "string" }
                    },
                    "required": ["field", "error", "message"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_operation() {
        let module = BooksModule::new(Arc::new(InMemoryBookStore::new()));
        let spec = module.openapi().unwrap();

        for method in ["get", "post"] {
            assert!(spec["paths"]["/books/"][method].is_object());
        }
        for method in ["get", "put", "delete"] {
            assert!(spec["paths"]["/books/{id}"][method].is_object());
        }
        assert!(spec["components"]["schemas"]["BookInput"].is_object());
    }

    #[test]
    fn schema_creates_books_table() {
        let migrations = BooksModule::new(Arc::new(InMemoryBookStore::new())).migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0]
            .up
            .contains("CREATE TABLE IF NOT EXISTS books"));
    }
}
