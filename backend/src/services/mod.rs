pub mod auth;
pub mod expenses;

pub use auth::{AuthService, Session};
pub use expenses::ExpenseService;
