use crate::domain::{BookBorrowRecord, BorrowId};
use crate::ports::borrow_repository::{BookBorrowRepository as BookBorrowRepositoryTrait, Result};
use async_trait::async_trait;

use super::MemoryStore;

/// In-memory implementation of BookBorrowRepository
pub struct BookBorrowRepository {
    store: MemoryStore,
}

impl BookBorrowRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookBorrowRepositoryTrait for BookBorrowRepository {
    async fn get_all(&self) -> Result<Vec<BookBorrowRecord>> {
        Ok(self.store.lock().await.borrows())
    }

    async fn get_by_id(&self, id: BorrowId) -> Result<Option<BookBorrowRecord>> {
        Ok(self.store.lock().await.borrow(id))
    }

    async fn add(&self, record: &BookBorrowRecord) -> Result<BorrowId> {
        Ok(self.store.lock().await.insert_borrow(record)?)
    }

    async fn update(&self, record: &BookBorrowRecord) -> Result<bool> {
        Ok(self.store.lock().await.replace_borrow(record).is_some())
    }

    async fn delete(&self, id: BorrowId) -> Result<bool> {
        Ok(self.store.lock().await.delete_borrow(id).is_some())
    }
}
