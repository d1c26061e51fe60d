pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use store::BookStore;

/// Books module: owns the in-memory store and serves the `/books` endpoints
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new() -> Self {
        Self::with_store(Arc::new(BookStore::new()))
    }

    /// Build the module around an existing store
    pub fn with_store(store: Arc<BookStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<BookStore> {
        &self.store
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
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

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        // The store lives only in memory; report what is about to be lost.
        if !self.store.is_empty() {
            tracing::warn!(
                module = self.name(),
                records = self.store.len(),
                "discarding in-memory books"
            );
        }
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn envelope_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Envelope" }
            }
        }
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

fn flag_parameter(name: &str, description: &str) -> serde_json::Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": "string", "enum": ["0", "1"] }
    })
}

fn payload_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/books": {
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": payload_body(),
                    "responses": {
                        "201": envelope_response("Book added; data.bookId holds the new id"),
                        "400": envelope_response("Missing name or readPage greater than pageCount")
                    }
                },
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        {
                            "name": "name",
                            "in": "query",
                            "required": false,
                            "description": "Case-insensitive substring of the book name",
                            "schema": { "type": "string" }
                        },
                        flag_parameter("reading", "1 for books being read, 0 otherwise"),
                        flag_parameter("finished", "1 for finished books, 0 otherwise")
                    ],
                    "responses": {
                        "200": envelope_response("data.books holds id, name and publisher of each match"),
                        "400": envelope_response("Invalid flag value")
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": envelope_response("data.book holds the full record"),
                        "404": envelope_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": payload_body(),
                    "responses": {
                        "200": envelope_response("data.book holds the updated record"),
                        "400": envelope_response("Missing name or readPage greater than pageCount"),
                        "404": envelope_response("Id not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": envelope_response("Book deleted"),
                        "404": envelope_response("Id not found")
                    }
                }
            },
            "/healthz/books": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {
                                "text/plain": {
                                    "schema": { "type": "string" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": book_schema(),
                "BookPayload": payload_schema()
            }
        }
    })
}

fn book_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "year": { "type": "integer", "format": "int32" },
            "author": { "type": "string" },
            "summary": { "type": "string" },
            "publisher": { "type": "string" },
            "pageCount": { "type": "integer", "format": "int32", "minimum": 0 },
            "readPage": { "type": "integer", "format": "int32", "minimum": 0 },
            "finished": { "type": "boolean" },
            "reading": { "type": "boolean" },
            "insertedAt": { "type": "string", "format": "date-time" },
            "updatedAt": { "type": "string", "format": "date-time" }
        },
        "required": [
            "id", "name", "year", "author", "summary", "publisher", "pageCount",
            "readPage", "finished", "reading", "insertedAt", "updatedAt"
        ]
    })
}

fn payload_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "year": { "type": "integer", "format": "int32" },
            "author": { "type": "string" },
            "summary": { "type": "string" },
            "publisher": { "type": "string" },
            "pageCount": { "type": "integer", "format": "int32", "minimum": 0 },
            "readPage": { "type": "integer", "format": "int32", "minimum": 0 },
            "reading": { "type": "boolean" }
        },
        "required": ["name"]
    })
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
