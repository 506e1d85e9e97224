pub mod book_repository;
pub mod borrow_repository;
pub mod member_repository;
pub mod unit_of_work;

pub use book_repository::BookRepository;
pub use borrow_repository::BookBorrowRepository;
pub use member_repository::MemberRepository;
pub use unit_of_work::{LendingTransaction, UnitOfWork};
