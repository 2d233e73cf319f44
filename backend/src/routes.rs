use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{docs::ApiDoc, handlers, middleware as auth_middleware, state::AppState};

/// Full application router without the IP rate limiter, which needs peer
/// connection info and is layered on in `main`.
pub fn build_router(state: AppState) -> Router {
    // Build public routes (no auth)
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/auth/sign-up", post(handlers::auth::sign_up))
        .route("/api/auth/sign-in", post(handlers::auth::sign_in))
        .route("/api/auth/refresh", post(handlers::auth::refresh));

    // Build user-protected routes (bearer access token required)
    let user_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/expenses",
            get(handlers::expenses::get_expense).post(handlers::expenses::save_expense),
        )
        .route(
            "/api/expenses/spending-cap",
            get(handlers::expenses::get_spending_cap).post(handlers::expenses::set_spending_cap),
        )
        .route(
            "/api/expenses/totals/by-category",
            get(handlers::expenses::totals_by_category),
        )
        .route(
            "/api/expenses/totals/by-subcategories",
            get(handlers::expenses::totals_by_subcategory),
        )
        .route(
            "/api/expenses/totals/by-month",
            get(handlers::expenses::totals_by_month),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allow_origins)),
        )
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(24 * 60 * 60))
}
