//! Monthly expense documents, spending caps, and aggregate totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validation::rules;

/// `category -> sub-category -> amount`.
pub type CategoryMap = BTreeMap<String, BTreeMap<String, f64>>;

/// Categories shown for a month that has no stored document yet.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Housing", "Food", "Transportation", "Hobbies", "OneTime"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
/// Spending for one calendar month.
pub struct MonthlyExpenses {
    pub year: i32,
    pub month: i32,
    #[schema(value_type = Object)]
    pub categories: CategoryMap,
}

impl MonthlyExpenses {
    /// Unsaved placeholder with every default category present and empty.
    pub fn empty(year: i32, month: i32) -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|name| (name.to_string(), BTreeMap::new()))
            .collect();
        Self {
            year,
            month,
            categories,
        }
    }

    pub fn total(&self) -> f64 {
        self.categories
            .values()
            .flat_map(|sub_categories| sub_categories.values())
            .sum()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    #[validate(range(min = 1970, message = "Year must be 1970 or later"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveExpenseRequest {
    #[validate(range(min = 1970, message = "Year must be 1970 or later"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i32,
    #[validate(custom(function = "rules::validate_categories"))]
    #[schema(value_type = Object)]
    pub categories: CategoryMap,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SpendingCapQuery {
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub category: String,
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub sub_category: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSpendingCapRequest {
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub category: String,
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub sub_category: String,
    #[validate(range(min = 0, message = "Cap must not be negative"))]
    pub cap: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpendingCap {
    pub category: String,
    pub sub_category: String,
    pub cap: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubCategoryTotalsQuery {
    #[validate(custom(function = "rules::validate_not_blank"))]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryTotal {
    pub sub_category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: i32,
    pub total: f64,
}
