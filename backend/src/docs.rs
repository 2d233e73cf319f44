#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::health::HealthStatus,
    models::{
        expense::{
            CategoryTotal, ExpenseQuery, MonthlyExpenses, MonthlyTotal, SaveExpenseRequest,
            SetSpendingCapRequest, SpendingCap, SpendingCapQuery, SubCategoryTotal,
            SubCategoryTotalsQuery,
        },
        user::{AuthResponse, LogoutResponse, SignInRequest, SignUpRequest, UserProfile, UserSummary},
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

/// Successful bodies are wrapped as `{ "value": <schema> }`; the schemas below
/// describe the wrapped value.
#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        sign_up_doc,
        sign_in_doc,
        refresh_doc,
        logout_doc,
        me_doc,
        get_expense_doc,
        save_expense_doc,
        get_spending_cap_doc,
        set_spending_cap_doc,
        totals_by_category_doc,
        totals_by_subcategory_doc,
        totals_by_month_doc
    ),
    components(
        schemas(
            // auth
            SignUpRequest,
            SignInRequest,
            UserSummary,
            UserProfile,
            AuthResponse,
            LogoutResponse,
            // expenses
            MonthlyExpenses,
            SaveExpenseRequest,
            SetSpendingCapRequest,
            SpendingCap,
            CategoryTotal,
            SubCategoryTotal,
            MonthlyTotal,
            HealthStatus
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Sign-up, sign-in, refresh rotation and logout"),
        (name = "Expenses", description = "Monthly expenses, spending caps and totals"),
        (name = "Health", description = "Liveness check")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());
        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, body = HealthStatus)),
    tag = "Health",
    security(())
)]
fn health_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = UserSummary),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username already exists")
    ),
    tag = "Auth",
    security(())
)]
fn sign_up_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; refresh token set as HttpOnly cookie", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth",
    security(())
)]
fn sign_in_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Rotated token pair; previous refresh token is revoked", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth",
    security(())
)]
fn refresh_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session ended; refresh cookie cleared", body = LogoutResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Signed-in user", body = UserProfile),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    get,
    path = "/api/expenses",
    params(ExpenseQuery),
    responses((status = 200, body = MonthlyExpenses)),
    tag = "Expenses"
)]
fn get_expense_doc() {}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = SaveExpenseRequest,
    responses(
        (status = 200, body = MonthlyExpenses),
        (status = 400, description = "Validation failed")
    ),
    tag = "Expenses"
)]
fn save_expense_doc() {}

#[utoipa::path(
    get,
    path = "/api/expenses/spending-cap",
    params(SpendingCapQuery),
    responses((status = 200, description = "Cap or null", body = SpendingCap)),
    tag = "Expenses"
)]
fn get_spending_cap_doc() {}

#[utoipa::path(
    post,
    path = "/api/expenses/spending-cap",
    request_body = SetSpendingCapRequest,
    responses(
        (status = 200, body = SpendingCap),
        (status = 400, description = "Validation failed")
    ),
    tag = "Expenses"
)]
fn set_spending_cap_doc() {}

#[utoipa::path(
    get,
    path = "/api/expenses/totals/by-category",
    responses((status = 200, body = Vec<CategoryTotal>)),
    tag = "Expenses"
)]
fn totals_by_category_doc() {}

#[utoipa::path(
    get,
    path = "/api/expenses/totals/by-subcategories",
    params(SubCategoryTotalsQuery),
    responses((status = 200, body = Vec<SubCategoryTotal>)),
    tag = "Expenses"
)]
fn totals_by_subcategory_doc() {}

#[utoipa::path(
    get,
    path = "/api/expenses/totals/by-month",
    responses((status = 200, body = Vec<MonthlyTotal>)),
    tag = "Expenses"
)]
fn totals_by_month_doc() {}
