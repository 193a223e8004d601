use serde::{Deserialize, Serialize};

use super::validation::{FieldViolation, ValidationErrors};

/// Storage-assigned book identifier.
pub type BookId = i64;

/// A persisted book, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier assigned on creation
    pub id: BookId,
    /// Title of the book, 2 to 100 characters
    pub title: String,
    /// Author of the book, 2 to 50 characters
    pub author: String,
    /// Optional genre, at most 30 characters
    pub genre: Option<String>,
    /// Price, strictly positive
    pub price: f64,
    /// Copies in stock, never negative
    pub quantity: i64,
}

/// Validated payload for creating or fully replacing a book.
///
/// Produced by [`super::validation::validate_book_input`]; stores trust that
/// every value already satisfies the field constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub price: f64,
    pub quantity: i64,
}

impl BookInput {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Raw query string of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksParams {
    pub author: Option<String>,
    pub genre: Option<String>,
    pub price_lt: Option<f64>,
    pub search: Option<String>,
}

/// Normalized list filter. Every present field narrows the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Exact author match
    pub author: Option<String>,
    /// Exact genre match
    pub genre: Option<String>,
    /// Exclusive price upper bound
    pub price_lt: Option<f64>,
    /// Case-insensitive substring of title, author or genre
    pub search: Option<String>,
}

impl TryFrom<ListBooksParams> for BookFilter {
    type Error = ValidationErrors;

    /// Empty strings and a zero `price_lt` count as not supplied, matching
    /// the behaviour existing clients rely on. `NaN` and infinite limits
    /// are rejected.
    fn try_from(params: ListBooksParams) -> Result<Self, Self::Error> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        if params.price_lt.is_some_and(|limit| !limit.is_finite()) {
            return Err(ValidationErrors::single(FieldViolation::new(
                "price_lt",
                "query_invalid",
                "price_lt should be a finite number",
            )));
        }

        Ok(Self {
            author: present(params.author),
            genre: present(params.genre),
            price_lt: params.price_lt.filter(|limit| *limit != 0.0),
            search: present(params.search),
        })
    }
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.genre.is_none()
            && self.price_lt.is_none()
            && self.search.is_none()
    }

    /// Whether `book` satisfies every present predicate.
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(author) = &self.author {
            if book.author != *author {
                return false;
            }
        }

        if let Some(genre) = &self.genre {
            if book.genre.as_deref() != Some(genre.as_str()) {
                return false;
            }
        }

        // NaN admits nothing, like `price < NULL` in SQL
        if let Some(limit) = self.price_lt {
            if !(book.price < limit) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_ascii_lowercase();
            let hit = |field: &str| field.to_ascii_lowercase().contains(&needle);
            if !(hit(book.title.as_str())
                || hit(book.author.as_str())
                || book.genre.as_deref().is_some_and(hit))
            {
                return false;
            }
        }

        true
    }
}
