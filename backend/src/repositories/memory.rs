//! In-process stores with the same contracts as the PostgreSQL repositories.
//!
//! Used by the test suites and handy for running the API without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::models::expense::{MonthlyExpenses, SpendingCap};
use crate::models::user::User;
use crate::repositories::{ExpenseRepository, UserRepository};
use crate::types::UserId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.users).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = lock(&self.users);
        if users.values().any(|existing| existing.username == user.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update_refresh_token_hash(
        &self,
        id: UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<Option<User>, AppError> {
        let mut users = lock(&self.users);
        Ok(users.get_mut(&id).map(|user| {
            user.refresh_token_hash = refresh_token_hash;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryExpenseRepository {
    months: Mutex<BTreeMap<(UserId, i32, i32), MonthlyExpenses>>,
    caps: Mutex<HashMap<(UserId, String, String), SpendingCap>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn find_month(
        &self,
        owner: UserId,
        year: i32,
        month: i32,
    ) -> Result<Option<MonthlyExpenses>, AppError> {
        Ok(lock(&self.months).get(&(owner, year, month)).cloned())
    }

    async fn upsert_month(
        &self,
        owner: UserId,
        expenses: &MonthlyExpenses,
    ) -> Result<MonthlyExpenses, AppError> {
        lock(&self.months).insert((owner, expenses.year, expenses.month), expenses.clone());
        Ok(expenses.clone())
    }

    async fn list_months(&self, owner: UserId) -> Result<Vec<MonthlyExpenses>, AppError> {
        // BTreeMap keys sort by owner, then year, then month.
        Ok(lock(&self.months)
            .iter()
            .filter(|((id, _, _), _)| *id == owner)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn find_spending_cap(
        &self,
        owner: UserId,
        category: &str,
        sub_category: &str,
    ) -> Result<Option<SpendingCap>, AppError> {
        let key = (owner, category.to_string(), sub_category.to_string());
        Ok(lock(&self.caps).get(&key).cloned())
    }

    async fn upsert_spending_cap(
        &self,
        owner: UserId,
        cap: &SpendingCap,
    ) -> Result<SpendingCap, AppError> {
        let key = (owner, cap.category.clone(), cap.sub_category.clone());
        lock(&self.caps).insert(key, cap.clone());
        Ok(cap.clone())
    }
}
