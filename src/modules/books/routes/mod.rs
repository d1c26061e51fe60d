use axum::{routing::get, Router};

use super::handlers::{self, SharedStore};

/// HTTP surface of the books module
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/books", get(handlers::list_books).post(handlers::create_book))
        .route(
            "/books/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route("/healthz/books", get(handlers::health_check))
        .with_state(store)
}
