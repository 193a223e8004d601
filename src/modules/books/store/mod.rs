//! Book storage.

mod memory;
mod sqlite;

pub use memory::InMemoryBookStore;
pub use sqlite::SqliteBookStore;

use async_trait::async_trait;

use super::{
    errors::BooksError,
    models::{Book, BookFilter, BookId, BookInput},
};

/// Persistence for books. Each call is one self-contained storage session.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persists a new book and returns it with its assigned id.
    async fn create(&self, input: BookInput) -> Result<Book, BooksError>;

    /// All books matching `filter`, in ascending id order.
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, BooksError>;

    /// Retrieve a single book.
    async fn get(&self, id: BookId) -> Result<Book, BooksError>;

    /// Replaces every field except the id.
    async fn update(&self, id: BookId, input: BookInput) -> Result<Book, BooksError>;

    /// Deletes a book permanently.
    async fn delete(&self, id: BookId) -> Result<(), BooksError>;
}
