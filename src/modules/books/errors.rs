//! Books errors.

use bookstore_http::error::AppError;
use thiserror::Error;

use super::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum BooksError {
    #[error("invalid book payload: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("book not found")]
    NotFound,

    #[error("storage error")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for BooksError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Storage(error)
    }
}

impl From<BooksError> for AppError {
    fn from(error: BooksError) -> Self {
        match error {
            BooksError::Validation(errors) => {
                AppError::validation(errors.to_details(), "Request validation failed")
            }
            BooksError::NotFound => AppError::not_found("Book not found"),
            BooksError::Storage(source) => {
                AppError::Internal(anyhow::Error::new(source).context("book storage failure"))
            }
        }
    }
}
