pub mod book_service;
pub mod borrow_service;
mod dependencies;
mod errors;
pub mod member_service;

pub use dependencies::ServiceDependencies;
pub use errors::{ApplicationError, Result};
