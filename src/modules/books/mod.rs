pub mod catalog;
pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;
use std::time::Duration;

pub use catalog::{Catalog, CatalogError};
pub use routes::BooksState;

/// Catalog queries, review mutations, and the deferred listing endpoints
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(state: BooksState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.state.catalog.is_empty() {
            tracing::warn!(module = self.name(), "catalog fixture contains no books");
        }

        let request_timeout = Duration::from_millis(ctx.settings.server.request_timeout_ms);
        if self.state.deferred_delay >= request_timeout {
            anyhow::bail!(
                "catalog.deferred_delay_ms ({:?}) must be below server.request_timeout_ms ({:?})",
                self.state.deferred_delay,
                request_timeout
            );
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = self.state.catalog.len(),
            deferred_delay = ?self.state.deferred_delay,
            token_required = self.state.guard.is_required(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let not_found = json!({
            "description": "Book or review not found",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let auth_failed = json!({
            "description": "Missing, invalid, or foreign bearer token",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let catalog = json!({
            "description": "Catalog keyed by ISBN",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Catalog" }
                }
            }
        });
        let book_list = json!({
            "description": "Matching books, possibly none",
            "content": {
                "application/json": {
                    "schema": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Book" }
                    }
                }
            }
        });
        let text_ok = json!({
            "description": "OK",
            "content": { "text/plain": { "schema": { "type": "string" } } }
        });
        let path_param = |name: &str| {
            json!([{ "name": name, "in": "path", "required": true, "schema": { "type": "string" } }])
        };

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Books"],
                        "responses": { "200": catalog }
                    }
                },
                "/books/isbn/{isbn}": {
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "parameters": path_param("isbn"),
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": not_found
                        }
                    }
                },
                "/books/author/{author}": {
                    "get": {
                        "summary": "Books by exact author name",
                        "tags": ["Books"],
                        "parameters": path_param("author"),
                        "responses": { "200": book_list }
                    }
                },
                "/books/title/{title}": {
                    "get": {
                        "summary": "Books by exact title",
                        "tags": ["Books"],
                        "parameters": path_param("title"),
                        "responses": { "200": book_list }
                    }
                },
                "/books/review/{isbn}": {
                    "get": {
                        "summary": "Reviews of a book",
                        "tags": ["Reviews"],
                        "parameters": path_param("isbn"),
                        "responses": {
                            "200": {
                                "description": "Reviews keyed by username",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Reviews" }
                                    }
                                }
                            },
                            "404": not_found
                        }
                    }
                },
                "/auth/review/{isbn}": {
                    "put": {
                        "summary": "Add or replace the caller's review",
                        "tags": ["Reviews"],
                        "parameters": path_param("isbn"),
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ReviewRequest" }
                                }
                            }
                        },
                        "responses": { "200": text_ok, "401": auth_failed, "403": auth_failed, "404": not_found }
                    },
                    "delete": {
                        "summary": "Delete the caller's review",
                        "tags": ["Reviews"],
                        "parameters": path_param("isbn"),
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/DeleteReviewRequest" }
                                }
                            }
                        },
                        "responses": { "200": text_ok, "401": auth_failed, "403": auth_failed, "404": not_found }
                    }
                },
                "/async/books": {
                    "get": {
                        "summary": "List all books after a simulated fetch delay",
                        "tags": ["Books"],
                        "responses": { "200": catalog }
                    }
                },
                "/callback/books": {
                    "get": {
                        "summary": "List all books via a completion callback",
                        "tags": ["Books"],
                        "responses": { "200": catalog }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string", "description": "Catalog key" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "reviews": { "$ref": "#/components/schemas/Reviews" }
                        },
                        "required": ["isbn", "title", "author", "reviews"]
                    },
                    "Catalog": {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/components/schemas/Book" }
                    },
                    "Reviews": {
                        "type": "object",
                        "description": "Review text keyed by username",
                        "additionalProperties": { "type": "string" }
                    },
                    "ReviewRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "review": { "type": "string" }
                        },
                        "required": ["username", "review"]
                    },
                    "DeleteReviewRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" }
                        },
                        "required": ["username"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.state.catalog.len(),
            "books module stopped"
        );
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(state: BooksState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_authz::{BearerGuard, TokenIssuer};
    use bookstore_kernel::settings::Settings;
    use std::sync::Arc;

    fn module(deferred_delay: Duration) -> BooksModule {
        let issuer = Arc::new(TokenIssuer::new("test-secret", 3600).unwrap());
        BooksModule::new(BooksState {
            catalog: Arc::new(Catalog::bundled().unwrap()),
            guard: BearerGuard::new(issuer, true),
            deferred_delay,
        })
    }

    #[tokio::test]
    async fn init_accepts_delay_below_request_timeout() {
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        assert!(module(Duration::from_millis(1000)).init(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn init_rejects_delay_that_would_always_time_out() {
        let mut settings = Settings::default();
        settings.server.request_timeout_ms = 500;
        let ctx = InitCtx {
            settings: &settings,
        };

        assert!(module(Duration::from_millis(500)).init(&ctx).await.is_err());
        assert!(module(Duration::from_millis(2000)).init(&ctx).await.is_err());
        assert!(module(Duration::from_millis(499)).init(&ctx).await.is_ok());
    }
}
