//! Data models shared across storage and API handlers.

pub mod expense;
pub mod user;

use serde::Serialize;

/// Every successful response body is wrapped as `{ "value": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub value: T,
}

impl<T> ApiResponse<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}
