//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::error::AppError;
use serde_json::Value;

use super::{
    errors::BooksError,
    models::{Book, BookFilter, BookId, ListBooksParams},
    store::BookStore,
    validation::{validate_book_input, FieldViolation, ValidationErrors},
};

pub type BooksState = Arc<dyn BookStore>;

/// Routes for the books collection; `/books` and `/books/` are equivalent.
pub fn router(store: BooksState) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(read_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

fn malformed(field: &str, error: &'static str, message: String) -> AppError {
    BooksError::from(ValidationErrors::single(FieldViolation::new(
        field, error, message,
    )))
    .into()
}

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| malformed("body", "json_invalid", rejection.body_text()))
}

fn book_id(id: Result<Path<BookId>, PathRejection>) -> Result<BookId, AppError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| malformed("id", "int_parsing", rejection.body_text()))
}

async fn create_book(
    State(store): State<BooksState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let input = validate_book_input(&body(payload)?).map_err(BooksError::from)?;

    let book = store.create(input).await?;
    tracing::info!(book_id = book.id, "book created");

    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(
    State(store): State<BooksState>,
    params: Result<Query<ListBooksParams>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(params) =
        params.map_err(|rejection| malformed("query", "query_invalid", rejection.body_text()))?;
    let filter = BookFilter::try_from(params).map_err(BooksError::from)?;

    let books = store.list(&filter).await?;
    tracing::debug!(?filter, count = books.len(), "books listed");

    Ok(Json(books))
}

async fn read_book(
    State(store): State<BooksState>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(id)?;

    Ok(Json(store.get(id).await?))
}

async fn update_book(
    State(store): State<BooksState>,
    id: Result<Path<BookId>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(id)?;
    let input = validate_book_input(&body(payload)?).map_err(BooksError::from)?;

    let book = store.update(id, input).await?;
    tracing::info!(book_id = book.id, "book updated");

    Ok(Json(book))
}

async fn delete_book(
    State(store): State<BooksState>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = book_id(id)?;

    store.delete(id).await?;
    tracing::info!(book_id = id, "book deleted");

    Ok(StatusCode::NO_CONTENT)
}
