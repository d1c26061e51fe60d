//! Request handlers for the `/books` endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use bookshelf_http::{ApiResponse, AppError};
use serde_json::{json, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::models::{Book, BookFilter, BookPayload, BookSummary, ListQuery, Violation};
use super::store::BookStore;

pub type SharedStore = Arc<BookStore>;

const ADD_NAME_REQUIRED: &str = "Failed to add book. Please provide the book name";
const ADD_PAGES_EXCEEDED: &str = "Failed to add book. readPage cannot be greater than pageCount";
const UPDATE_NAME_REQUIRED: &str = "Failed to update book. Please provide the book name";
const UPDATE_PAGES_EXCEEDED: &str =
    "Failed to update book. readPage cannot be greater than pageCount";
const UPDATE_ID_NOT_FOUND: &str = "Failed to update book. Id not found";
const DELETE_ID_NOT_FOUND: &str = "Failed to delete book. Id not found";
const BOOK_NOT_FOUND: &str = "Book not found";

fn new_book_id() -> String {
    Uuid::now_v7().to_string()
}

/// `POST /books`
pub async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let Json(payload) = payload?;
    let fields = payload.validate().map_err(|violation| match violation {
        Violation::MissingName => AppError::validation(ADD_NAME_REQUIRED),
        Violation::ReadPageExceedsPageCount => AppError::validation(ADD_PAGES_EXCEEDED),
    })?;

    let book = Book::new(new_book_id(), fields, OffsetDateTime::now_utc());
    let book_id = book.id.clone();
    store.push(book);

    tracing::info!(book_id = %book_id, "book added");
    Ok(ApiResponse::created(
        "Book added successfully",
        json!({ "bookId": book_id }),
    ))
}

/// `GET /books`
pub async fn list_books(
    State(store): State<SharedStore>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let Query(query) = query?;
    let filter =
        BookFilter::try_from(query).map_err(|invalid| AppError::bad_request(invalid.to_string()))?;

    let books: Vec<BookSummary> = store.list(&filter);
    tracing::debug!(matched = books.len(), "books listed");
    Ok(ApiResponse::ok(json!({ "books": books })))
}

/// `GET /books/{id}`
pub async fn get_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, AppError> {
    let book = store
        .find(&id)
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;
    Ok(ApiResponse::ok(json!({ "book": book })))
}

/// `PUT /books/{id}`
///
/// Existence is checked first, then the payload. A rejected payload never
/// touches the stored record.
pub async fn update_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let outcome = store.modify(&id, |book: &mut Book| -> Result<Book, AppError> {
        let Json(payload) = payload?;
        let fields = payload.validate().map_err(|violation| match violation {
            Violation::MissingName => AppError::validation(UPDATE_NAME_REQUIRED),
            Violation::ReadPageExceedsPageCount => AppError::validation(UPDATE_PAGES_EXCEEDED),
        })?;
        book.apply(fields, OffsetDateTime::now_utc());
        Ok(book.clone())
    });

    let book = match outcome {
        Some(result) => result?,
        None => return Err(AppError::not_found_with(UPDATE_ID_NOT_FOUND, json!({ "id": id }))),
    };

    tracing::info!(book_id = %book.id, "book updated");
    Ok(ApiResponse::ok(json!({ "book": book })).with_message("Book updated successfully"))
}

/// `DELETE /books/{id}`
pub async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    store
        .remove(&id)
        .ok_or_else(|| AppError::not_found_with(DELETE_ID_NOT_FOUND, json!({ "id": id })))?;

    tracing::info!(book_id = %id, "book deleted");
    Ok(ApiResponse::message("Book deleted successfully"))
}

/// Health check endpoint
pub async fn health_check(State(store): State<SharedStore>) -> String {
    format!("books module is healthy ({} records)", store.len())
}
