pub mod book;
pub mod borrow;
pub mod commands;
pub mod errors;
pub mod member;
pub mod value_objects;

pub use book::Book;
pub use borrow::{BookBorrowRecord, BorrowStatus};
pub use errors::ValidationError;
pub use member::Member;
pub use value_objects::*;
