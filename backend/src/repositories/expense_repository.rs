//! Expense and spending-cap store, always scoped to the owning user.

use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};

use crate::error::AppError;
use crate::models::expense::{CategoryMap, MonthlyExpenses, SpendingCap};
use crate::types::{ExpenseId, SpendingCapId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn find_month(
        &self,
        owner: UserId,
        year: i32,
        month: i32,
    ) -> Result<Option<MonthlyExpenses>, AppError>;

    /// Inserts or replaces the document for `(owner, year, month)`.
    async fn upsert_month(
        &self,
        owner: UserId,
        expenses: &MonthlyExpenses,
    ) -> Result<MonthlyExpenses, AppError>;

    /// All of the owner's documents in chronological order.
    async fn list_months(&self, owner: UserId) -> Result<Vec<MonthlyExpenses>, AppError>;

    async fn find_spending_cap(
        &self,
        owner: UserId,
        category: &str,
        sub_category: &str,
    ) -> Result<Option<SpendingCap>, AppError>;

    /// Inserts or replaces the cap for `(owner, category, sub_category)`.
    async fn upsert_spending_cap(
        &self,
        owner: UserId,
        cap: &SpendingCap,
    ) -> Result<SpendingCap, AppError>;
}

#[derive(Debug, FromRow)]
struct ExpenseRow {
    year: i32,
    month: i32,
    categories: Json<CategoryMap>,
}

impl From<ExpenseRow> for MonthlyExpenses {
    fn from(row: ExpenseRow) -> Self {
        Self {
            year: row.year,
            month: row.month,
            categories: row.categories.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgExpenseRepository {
    pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn find_month(
        &self,
        owner: UserId,
        year: i32,
        month: i32,
    ) -> Result<Option<MonthlyExpenses>, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            "SELECT year, month, categories FROM expenses \
             WHERE user_id = $1 AND year = $2 AND month = $3",
        )
        .bind(owner)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(MonthlyExpenses::from))
    }

    async fn upsert_month(
        &self,
        owner: UserId,
        expenses: &MonthlyExpenses,
    ) -> Result<MonthlyExpenses, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            "INSERT INTO expenses (id, user_id, year, month, categories) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, year, month) \
             DO UPDATE SET categories = EXCLUDED.categories, updated_at = NOW() \
             RETURNING year, month, categories",
        )
        .bind(ExpenseId::new())
        .bind(owner)
        .bind(expenses.year)
        .bind(expenses.month)
        .bind(Json(&expenses.categories))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_months(&self, owner: UserId) -> Result<Vec<MonthlyExpenses>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            "SELECT year, month, categories FROM expenses \
             WHERE user_id = $1 ORDER BY year, month",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MonthlyExpenses::from).collect())
    }

    async fn find_spending_cap(
        &self,
        owner: UserId,
        category: &str,
        sub_category: &str,
    ) -> Result<Option<SpendingCap>, AppError> {
        let cap = sqlx::query_as::<_, SpendingCap>(
            "SELECT category, sub_category, cap FROM spending_caps \
             WHERE user_id = $1 AND category = $2 AND sub_category = $3",
        )
        .bind(owner)
        .bind(category)
        .bind(sub_category)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cap)
    }

    async fn upsert_spending_cap(
        &self,
        owner: UserId,
        cap: &SpendingCap,
    ) -> Result<SpendingCap, AppError> {
        let stored = sqlx::query_as::<_, SpendingCap>(
            "INSERT INTO spending_caps (id, user_id, category, sub_category, cap) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, category, sub_category) \
             DO UPDATE SET cap = EXCLUDED.cap, updated_at = NOW() \
             RETURNING category, sub_category, cap",
        )
        .bind(SpendingCapId::new())
        .bind(owner)
        .bind(&cap.category)
        .bind(&cap.sub_category)
        .bind(cap.cap)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }
}
