use crate::domain::{Book, BookBorrowRecord, BookId, BorrowId, Member, MemberId};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

/// Errors raised by the in-memory tables.
///
/// Mirrors the foreign key constraints of the relational schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("foreign key violation: {table} {id} does not exist")]
    ForeignKeyViolation { table: &'static str, id: i64 },
}

/// A row as it was before a write. Restoring it undoes the write.
#[derive(Debug)]
pub enum RowImage {
    Book(BookId, Option<Book>),
    Member(MemberId, Option<Member>),
    Borrow(BorrowId, Option<BookBorrowRecord>),
}

/// Rows of the three tables plus their identity counters.
#[derive(Debug, Default)]
pub struct Tables {
    books: BTreeMap<BookId, Book>,
    members: BTreeMap<MemberId, Member>,
    borrows: BTreeMap<BorrowId, BookBorrowRecord>,
    last_book_id: i64,
    last_member_id: i64,
    last_borrow_id: i64,
}

impl Tables {
    pub fn books(&self) -> Vec<Book> {
        self.books.values().cloned().collect()
    }

    pub fn book(&self, id: BookId) -> Option<Book> {
        self.books.get(&id).cloned()
    }

    pub fn insert_book(&mut self, book: &Book) -> BookId {
        self.last_book_id += 1;
        let id = BookId::new(self.last_book_id);
        self.books.insert(id, Book { id, ..book.clone() });
        id
    }

    /// Writes catalog fields and shifts `available_copies` by the change in
    /// `total_copies`, leaving copies on loan untouched.
    pub fn update_book_catalog(&mut self, book: &Book) -> bool {
        let Some(stored) = self.books.get_mut(&book.id) else {
            return false;
        };

        let available = stored.available_copies + (book.total_copies - stored.total_copies);
        if available < 0 {
            return false;
        }

        *stored = Book {
            available_copies: available,
            created_at: stored.created_at,
            ..book.clone()
        };
        true
    }

    /// Writes every column, including `available_copies`. Returns the
    /// previous row, or `None` when the book does not exist.
    pub fn replace_book(&mut self, book: &Book) -> Option<Book> {
        let stored = self.books.get_mut(&book.id)?;
        Some(std::mem::replace(stored, book.clone()))
    }

    /// Deletes the book together with its borrow history.
    pub fn delete_book(&mut self, id: BookId) -> Option<(Book, Vec<BookBorrowRecord>)> {
        let book = self.books.remove(&id)?;
        let history = self.remove_borrows(|record| record.book_id == id);
        Some((book, history))
    }

    pub fn members(&self) -> Vec<Member> {
        self.members.values().cloned().collect()
    }

    pub fn member(&self, id: MemberId) -> Option<Member> {
        self.members.get(&id).cloned()
    }

    pub fn insert_member(&mut self, member: &Member) -> MemberId {
        self.last_member_id += 1;
        let id = MemberId::new(self.last_member_id);
        self.members.insert(id, Member { id, ..member.clone() });
        id
    }

    pub fn replace_member(&mut self, member: &Member) -> bool {
        match self.members.get_mut(&member.id) {
            Some(stored) => {
                *stored = member.clone();
                true
            }
            None => false,
        }
    }

    /// Deletes the member together with their borrow history.
    pub fn delete_member(&mut self, id: MemberId) -> Option<(Member, Vec<BookBorrowRecord>)> {
        let member = self.members.remove(&id)?;
        let history = self.remove_borrows(|record| record.member_id == id);
        Some((member, history))
    }

    pub fn borrows(&self) -> Vec<BookBorrowRecord> {
        self.borrows.values().cloned().collect()
    }

    pub fn borrow(&self, id: BorrowId) -> Option<BookBorrowRecord> {
        self.borrows.get(&id).cloned()
    }

    pub fn insert_borrow(
        &mut self,
        record: &BookBorrowRecord,
    ) -> Result<BorrowId, MemoryStoreError> {
        if !self.books.contains_key(&record.book_id) {
            return Err(MemoryStoreError::ForeignKeyViolation {
                table: "books",
                id: record.book_id.value(),
            });
        }
        if !self.members.contains_key(&record.member_id) {
            return Err(MemoryStoreError::ForeignKeyViolation {
                table: "members",
                id: record.member_id.value(),
            });
        }

        self.last_borrow_id += 1;
        let id = BorrowId::new(self.last_borrow_id);
        self.borrows.insert(
            id,
            BookBorrowRecord {
                id,
                ..record.clone()
            },
        );
        Ok(id)
    }

    /// Returns the previous row, or `None` when the record does not exist.
    pub fn replace_borrow(&mut self, record: &BookBorrowRecord) -> Option<BookBorrowRecord> {
        let stored = self.borrows.get_mut(&record.id)?;
        Some(std::mem::replace(stored, record.clone()))
    }

    pub fn delete_borrow(&mut self, id: BorrowId) -> Option<BookBorrowRecord> {
        self.borrows.remove(&id)
    }

    pub fn count_active_borrows(&self, predicate: impl Fn(&BookBorrowRecord) -> bool) -> i64 {
        self.borrows
            .values()
            .filter(|record| record.is_active() && predicate(record))
            .count() as i64
    }

    /// Puts a row back the way it was. Identity counters are not rewound,
    /// like a database sequence.
    pub fn restore(&mut self, image: RowImage) {
        match image {
            RowImage::Book(id, Some(book)) => {
                self.books.insert(id, book);
            }
            RowImage::Book(id, None) => {
                self.books.remove(&id);
            }
            RowImage::Member(id, Some(member)) => {
                self.members.insert(id, member);
            }
            RowImage::Member(id, None) => {
                self.members.remove(&id);
            }
            RowImage::Borrow(id, Some(record)) => {
                self.borrows.insert(id, record);
            }
            RowImage::Borrow(id, None) => {
                self.borrows.remove(&id);
            }
        }
    }

    fn remove_borrows(
        &mut self,
        predicate: impl Fn(&BookBorrowRecord) -> bool,
    ) -> Vec<BookBorrowRecord> {
        let mut removed = Vec::new();
        self.borrows.retain(|_, record| {
            if predicate(record) {
                removed.push(record.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

/// Shared handle to the in-memory tables.
///
/// Cloning is cheap; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }

    /// Holds the tables exclusively until the guard is dropped.
    pub(crate) async fn lock_owned(&self) -> OwnedMutexGuard<Tables> {
        Arc::clone(&self.tables).lock_owned().await
    }
}
