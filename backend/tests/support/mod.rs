#![allow(dead_code)]
use std::{env, net::SocketAddr, sync::Arc};

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use budget_buddy_backend::{
    config::Config,
    repositories::memory::{InMemoryExpenseRepository, InMemoryUserRepository},
    routes::build_router,
    services::{AuthService, ExpenseService},
    state::AppState,
    utils::{cookies::SameSite, jwt::TokenSettings, password::SecretHasher},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        production_mode: false,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://localhost/budget_buddy_test".into(),
        database_connect_timeout_secs: 5,
        jwt_access_secret: "test-access-secret-value".into(),
        jwt_refresh_secret: "test-refresh-secret-value".into(),
        jwt_access_ttl: 900,
        jwt_refresh_ttl: 604_800,
        cookie_secure: false,
        cookie_same_site: SameSite::Lax,
        cors_allow_origins: vec!["http://localhost:5173".into()],
        rate_limit_per_minute: 60,
        // Small cost keeps the suite fast.
        password_hash_memory_kib: 1024,
        password_hash_iterations: 1,
    }
}

pub struct TestApp {
    pub router: Router,
    pub config: Config,
    pub users: Arc<InMemoryUserRepository>,
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> TestApp {
    let users = Arc::new(InMemoryUserRepository::new());
    let auth = AuthService::new(
        users.clone(),
        SecretHasher::from_config(&config).expect("hasher"),
        TokenSettings::from(&config),
    );
    let expenses = ExpenseService::new(Arc::new(InMemoryExpenseRepository::new()));
    let router = build_router(AppState::new(config.clone(), auth, expenses));
    TestApp {
        router,
        config,
        users,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().expect("header value"),
    );
    request
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("header value"));
    request
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router call")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// `name=value` pair of the first `Set-Cookie` header.
pub fn set_cookie_pair(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Pool for `TEST_DATABASE_URL` with migrations applied, or `None` when unset.
pub async fn test_pool() -> Option<PgPool> {
    let url = env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}
