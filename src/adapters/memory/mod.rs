//! In-memory adapters.
//!
//! All repositories created from one [`MemoryStore`] share the same tables.
//! Used by the tests and by the server when no database is configured.

pub mod book_repository;
pub mod borrow_repository;
pub mod member_repository;
pub mod store;
pub mod unit_of_work;

pub use book_repository::BookRepository as MemoryBookRepository;
pub use borrow_repository::BookBorrowRepository as MemoryBorrowRepository;
pub use member_repository::MemberRepository as MemoryMemberRepository;
pub use store::{MemoryStore, MemoryStoreError};
pub use unit_of_work::UnitOfWork as MemoryUnitOfWork;
