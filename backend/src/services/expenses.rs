use std::collections::BTreeMap;
use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppError,
    models::expense::{
        CategoryTotal, ExpenseQuery, MonthlyExpenses, MonthlyTotal, SaveExpenseRequest,
        SetSpendingCapRequest, SpendingCap, SpendingCapQuery, SubCategoryTotal,
        SubCategoryTotalsQuery,
    },
    repositories::ExpenseRepository,
    types::UserId,
};

/// Owner-scoped access to monthly expense documents, caps and totals.
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
}

impl ExpenseService {
    pub fn new(expenses: Arc<dyn ExpenseRepository>) -> Self {
        Self { expenses }
    }

    /// Returns the stored month, or an unsaved document with the default categories.
    pub async fn get_expense(
        &self,
        owner: UserId,
        query: ExpenseQuery,
    ) -> Result<MonthlyExpenses, AppError> {
        query.validate()?;
        let stored = self
            .expenses
            .find_month(owner, query.year, query.month)
            .await?;
        Ok(stored.unwrap_or_else(|| MonthlyExpenses::empty(query.year, query.month)))
    }

    pub async fn save_expense(
        &self,
        owner: UserId,
        payload: SaveExpenseRequest,
    ) -> Result<MonthlyExpenses, AppError> {
        payload.validate()?;
        let document = MonthlyExpenses {
            year: payload.year,
            month: payload.month,
            categories: payload.categories,
        };
        let saved = self.expenses.upsert_month(owner, &document).await?;
        tracing::debug!(
            user_id = %owner,
            year = saved.year,
            month = saved.month,
            "Saved monthly expenses"
        );
        Ok(saved)
    }

    pub async fn get_spending_cap(
        &self,
        owner: UserId,
        query: SpendingCapQuery,
    ) -> Result<Option<SpendingCap>, AppError> {
        query.validate()?;
        self.expenses
            .find_spending_cap(owner, &query.category, &query.sub_category)
            .await
    }

    pub async fn set_spending_cap(
        &self,
        owner: UserId,
        payload: SetSpendingCapRequest,
    ) -> Result<SpendingCap, AppError> {
        payload.validate()?;
        let cap = SpendingCap {
            category: payload.category,
            sub_category: payload.sub_category,
            cap: payload.cap,
        };
        self.expenses.upsert_spending_cap(owner, &cap).await
    }

    pub async fn totals_by_category(&self, owner: UserId) -> Result<Vec<CategoryTotal>, AppError> {
        let months = self.expenses.list_months(owner).await?;
        Ok(category_totals(&months))
    }

    pub async fn totals_by_subcategory(
        &self,
        owner: UserId,
        query: SubCategoryTotalsQuery,
    ) -> Result<Vec<SubCategoryTotal>, AppError> {
        query.validate()?;
        let months = self.expenses.list_months(owner).await?;
        Ok(sub_category_totals(&months, &query.category))
    }

    pub async fn totals_by_month(&self, owner: UserId) -> Result<Vec<MonthlyTotal>, AppError> {
        let months = self.expenses.list_months(owner).await?;
        Ok(monthly_totals(&months))
    }
}

pub fn category_totals(months: &[MonthlyExpenses]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (category, sub_categories) in months.iter().flat_map(|doc| doc.categories.iter()) {
        *totals.entry(category.as_str()).or_default() += sub_categories.values().sum::<f64>();
    }
    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

pub fn sub_category_totals(months: &[MonthlyExpenses], category: &str) -> Vec<SubCategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for sub_categories in months.iter().filter_map(|doc| doc.categories.get(category)) {
        for (sub_category, amount) in sub_categories {
            *totals.entry(sub_category.as_str()).or_default() += amount;
        }
    }
    totals
        .into_iter()
        .map(|(sub_category, total)| SubCategoryTotal {
            sub_category: sub_category.to_string(),
            total,
        })
        .collect()
}

pub fn monthly_totals(months: &[MonthlyExpenses]) -> Vec<MonthlyTotal> {
    let mut totals: Vec<MonthlyTotal> = months
        .iter()
        .map(|doc| MonthlyTotal {
            year: doc.year,
            month: doc.month,
            total: doc.total(),
        })
        .collect();
    totals.sort_by_key(|entry| (entry.year, entry.month));
    totals
}
