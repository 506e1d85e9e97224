use crate::domain::{Book, BookBorrowRecord, BookId, BorrowId, Member, MemberId};
use crate::ports::unit_of_work::{
    LendingTransaction, Result, UnitOfWork as UnitOfWorkTrait,
};
use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use super::{
    MemoryStore,
    store::{RowImage, Tables},
};

/// In-memory implementation of UnitOfWork
///
/// A transaction holds the store lock for its whole lifetime, so transactions
/// and plain repository calls are serialized. Writes go straight to the
/// tables; each one records the row it replaced so a rollback can put it back.
pub struct UnitOfWork {
    store: MemoryStore,
}

impl UnitOfWork {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UnitOfWorkTrait for UnitOfWork {
    async fn begin(&self) -> Result<Box<dyn LendingTransaction>> {
        let tables = self.store.lock_owned().await;
        Ok(Box::new(Transaction {
            tables,
            undo: Vec::new(),
        }))
    }
}

/// Open in-memory transaction. Dropping it without `commit` replays the
/// undo log in reverse.
pub struct Transaction {
    tables: OwnedMutexGuard<Tables>,
    undo: Vec<RowImage>,
}

impl Drop for Transaction {
    fn drop(&mut self) {
        while let Some(image) = self.undo.pop() {
            self.tables.restore(image);
        }
    }
}

#[async_trait]
impl LendingTransaction for Transaction {
    async fn lock_book(&mut self, id: BookId) -> Result<Option<Book>> {
        Ok(self.tables.book(id))
    }

    async fn update_book(&mut self, book: &Book) -> Result<bool> {
        let Some(previous) = self.tables.replace_book(book) else {
            return Ok(false);
        };
        self.undo.push(RowImage::Book(book.id, Some(previous)));
        Ok(true)
    }

    async fn delete_book(&mut self, id: BookId) -> Result<bool> {
        let Some((book, history)) = self.tables.delete_book(id) else {
            return Ok(false);
        };
        self.undo.push(RowImage::Book(id, Some(book)));
        self.undo.extend(
            history
                .into_iter()
                .map(|record| RowImage::Borrow(record.id, Some(record))),
        );
        Ok(true)
    }

    async fn share_member(&mut self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.tables.member(id))
    }

    async fn lock_member(&mut self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.tables.member(id))
    }

    async fn delete_member(&mut self, id: MemberId) -> Result<bool> {
        let Some((member, history)) = self.tables.delete_member(id) else {
            return Ok(false);
        };
        self.undo.push(RowImage::Member(id, Some(member)));
        self.undo.extend(
            history
                .into_iter()
                .map(|record| RowImage::Borrow(record.id, Some(record))),
        );
        Ok(true)
    }

    async fn lock_borrow(&mut self, id: BorrowId) -> Result<Option<BookBorrowRecord>> {
        Ok(self.tables.borrow(id))
    }

    async fn insert_borrow(&mut self, record: &BookBorrowRecord) -> Result<BorrowId> {
        let id = self.tables.insert_borrow(record)?;
        self.undo.push(RowImage::Borrow(id, None));
        Ok(id)
    }

    async fn update_borrow(&mut self, record: &BookBorrowRecord) -> Result<bool> {
        let Some(previous) = self.tables.replace_borrow(record) else {
            return Ok(false);
        };
        self.undo.push(RowImage::Borrow(record.id, Some(previous)));
        Ok(true)
    }

    async fn delete_borrow(&mut self, id: BorrowId) -> Result<bool> {
        let Some(previous) = self.tables.delete_borrow(id) else {
            return Ok(false);
        };
        self.undo.push(RowImage::Borrow(id, Some(previous)));
        Ok(true)
    }

    async fn count_active_for_book(&mut self, book_id: BookId) -> Result<i64> {
        Ok(self
            .tables
            .count_active_borrows(|record| record.book_id == book_id))
    }

    async fn count_active_for_member(&mut self, member_id: MemberId) -> Result<i64> {
        Ok(self
            .tables
            .count_active_borrows(|record| record.member_id == member_id))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut tx = self;
        tx.undo.clear();
        Ok(())
    }
}
