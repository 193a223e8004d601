//! SQLite-backed book store.

use async_trait::async_trait;
use sqlx::{
    query, query_as, sqlite::SqliteRow, FromRow, QueryBuilder, Row, Sqlite, SqlitePool,
    Transaction,
};

use super::BookStore;
use crate::modules::books::{
    errors::BooksError,
    models::{Book, BookFilter, BookId, BookInput},
};

const INSERT_BOOK_SQL: &str = include_str!("../sql/insert_book.sql");
const GET_BOOK_SQL: &str = include_str!("../sql/get_book.sql");
const LIST_BOOKS_SQL: &str = include_str!("../sql/list_books.sql");
const UPDATE_BOOK_SQL: &str = include_str!("../sql/update_book.sql");
const DELETE_BOOK_SQL: &str = include_str!("../sql/delete_book.sql");

/// Book store over a SQLite pool. Every operation runs in its own
/// transaction, rolled back on drop unless committed.
#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>, BooksError> {
        self.pool.begin().await.map_err(BooksError::from)
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn create(&self, input: BookInput) -> Result<Book, BooksError> {
        let mut tx = self.begin().await?;

        let book = query_as::<Sqlite, Book>(INSERT_BOOK_SQL)
            .bind(input.title)
            .bind(input.author)
            .bind(input.genre)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(book_id = book.id, "book row inserted");

        Ok(book)
    }

    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, BooksError> {
        let mut tx = self.begin().await?;

        let books = list_query(filter)
            .build_query_as::<Book>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(books)
    }

    async fn get(&self, id: BookId) -> Result<Book, BooksError> {
        let mut tx = self.begin().await?;

        // RowNotFound converts to BooksError::NotFound
        let book = query_as::<Sqlite, Book>(GET_BOOK_SQL)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(book)
    }

    async fn update(&self, id: BookId, input: BookInput) -> Result<Book, BooksError> {
        let mut tx = self.begin().await?;

        let book = query_as::<Sqlite, Book>(UPDATE_BOOK_SQL)
            .bind(input.title)
            .bind(input.author)
            .bind(input.genre)
            .bind(input.price)
            .bind(input.quantity)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BooksError::NotFound)?;

        tx.commit().await?;

        Ok(book)
    }

    async fn delete(&self, id: BookId) -> Result<(), BooksError> {
        let mut tx = self.begin().await?;

        let result = query(DELETE_BOOK_SQL).bind(id).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(BooksError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

/// Compose the list statement from the present filter predicates.
fn list_query(filter: &BookFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::<Sqlite>::new(LIST_BOOKS_SQL);

    if let Some(author) = &filter.author {
        builder.push(" AND author = ").push_bind(author.clone());
    }

    if let Some(genre) = &filter.genre {
        builder.push(" AND genre = ").push_bind(genre.clone());
    }

    if let Some(limit) = filter.price_lt {
        builder.push(" AND price < ").push_bind(limit);
    }

    // LOWER() folds ASCII letters only; the needle is folded the same way
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(&search.to_ascii_lowercase()));

        builder.push(" AND (");
        for (i, column) in ["title", "author", "genre"].into_iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(format!("LOWER({column}) LIKE "))
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        builder.push(")");
    }

    builder.push(" ORDER BY id");
    builder
}

/// Make `%`, `_` and `\` match literally inside a LIKE pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            genre: row.try_get("genre")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}
