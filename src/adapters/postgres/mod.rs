pub mod book_repository;
pub mod borrow_repository;
pub mod member_repository;
pub mod pool;
mod rows;
pub mod unit_of_work;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use borrow_repository::BookBorrowRepository as PostgresBorrowRepository;
pub use member_repository::MemberRepository as PostgresMemberRepository;
pub use pool::{connect, run_migrations};
pub use unit_of_work::UnitOfWork as PostgresUnitOfWork;
