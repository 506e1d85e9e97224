use crate::domain::{Book, BookId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;

use super::MemoryStore;

/// In-memory implementation of BookRepository
pub struct BookRepository {
    store: MemoryStore,
}

impl BookRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn get_all(&self) -> Result<Vec<Book>> {
        Ok(self.store.lock().await.books())
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.store.lock().await.book(id))
    }

    async fn add(&self, book: &Book) -> Result<BookId> {
        Ok(self.store.lock().await.insert_book(book))
    }

    async fn update(&self, book: &Book) -> Result<bool> {
        Ok(self.store.lock().await.update_book_catalog(book))
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        Ok(self.store.lock().await.delete_book(id).is_some())
    }
}
