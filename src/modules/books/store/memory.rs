use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookStore;
use crate::modules::books::{
    errors::BooksError,
    models::{Book, BookFilter, BookId, BookInput},
};

#[derive(Debug)]
struct State {
    next_id: BookId,
    books: BTreeMap<BookId, Book>,
}

/// Process-local store. Ids start at 1 and are never handed out twice.
#[derive(Debug)]
pub struct InMemoryBookStore {
    state: RwLock<State>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                books: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create(&self, input: BookInput) -> Result<Book, BooksError> {
        let mut state = self.state.write().await;

        let id = state.next_id;
        state.next_id += 1;

        let book = input.into_book(id);
        state.books.insert(id, book.clone());

        Ok(book)
    }

    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, BooksError> {
        let state = self.state.read().await;

        Ok(state
            .books
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect())
    }

    async fn get(&self, id: BookId) -> Result<Book, BooksError> {
        let state = self.state.read().await;

        state.books.get(&id).cloned().ok_or(BooksError::NotFound)
    }

    async fn update(&self, id: BookId, input: BookInput) -> Result<Book, BooksError> {
        let mut state = self.state.write().await;

        let slot = state.books.get_mut(&id).ok_or(BooksError::NotFound)?;
        *slot = input.into_book(id);

        Ok(slot.clone())
    }

    async fn delete(&self, id: BookId) -> Result<(), BooksError> {
        let mut state = self.state.write().await;

        state
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(BooksError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        contract::create_then_get_round_trips(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        contract::update_replaces_all_fields(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        contract::missing_ids_are_not_found(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn delete_removes_and_ids_are_not_reused() {
        contract::delete_removes_and_ids_are_not_reused(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn list_applies_filters() {
        contract::list_applies_filters(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        contract::search_is_case_insensitive_substring(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn search_folds_ascii_letters_only() {
        contract::search_folds_ascii_letters_only(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn non_finite_price_limits() {
        contract::non_finite_price_limits(&InMemoryBookStore::new()).await;
    }

    #[tokio::test]
    async fn removing_a_filter_never_removes_matches() {
        contract::removing_a_filter_never_removes_matches(&InMemoryBookStore::new()).await;
    }
}
