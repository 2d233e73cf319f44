pub mod expense_repository;
pub mod memory;
pub mod user_repository;

pub use expense_repository::*;
pub use memory::*;
pub use user_repository::*;
