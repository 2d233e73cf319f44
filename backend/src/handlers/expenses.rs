use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    error::AppError,
    extractors::{AppJson, AppQuery},
    middleware::auth::AuthenticatedUser,
    models::{
        expense::{
            CategoryTotal, ExpenseQuery, MonthlyExpenses, MonthlyTotal, SaveExpenseRequest,
            SetSpendingCapRequest, SpendingCap, SpendingCapQuery, SubCategoryTotal,
            SubCategoryTotalsQuery,
        },
        ApiResponse,
    },
    state::AppState,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub async fn get_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<ExpenseQuery>,
) -> ApiResult<MonthlyExpenses> {
    let doc = state.expenses.get_expense(user.user_id, query).await?;
    Ok(Json(ApiResponse::new(doc)))
}

pub async fn save_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(payload): AppJson<SaveExpenseRequest>,
) -> ApiResult<MonthlyExpenses> {
    let doc = state.expenses.save_expense(user.user_id, payload).await?;
    Ok(Json(ApiResponse::new(doc)))
}

pub async fn get_spending_cap(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<SpendingCapQuery>,
) -> ApiResult<Option<SpendingCap>> {
    let cap = state.expenses.get_spending_cap(user.user_id, query).await?;
    Ok(Json(ApiResponse::new(cap)))
}

pub async fn set_spending_cap(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(payload): AppJson<SetSpendingCapRequest>,
) -> ApiResult<SpendingCap> {
    let cap = state.expenses.set_spending_cap(user.user_id, payload).await?;
    Ok(Json(ApiResponse::new(cap)))
}

pub async fn totals_by_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<CategoryTotal>> {
    let totals = state.expenses.totals_by_category(user.user_id).await?;
    Ok(Json(ApiResponse::new(totals)))
}

pub async fn totals_by_subcategory(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<SubCategoryTotalsQuery>,
) -> ApiResult<Vec<SubCategoryTotal>> {
    let totals = state
        .expenses
        .totals_by_subcategory(user.user_id, query)
        .await?;
    Ok(Json(ApiResponse::new(totals)))
}

pub async fn totals_by_month(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<MonthlyTotal>> {
    let totals = state.expenses.totals_by_month(user.user_id).await?;
    Ok(Json(ApiResponse::new(totals)))
}
