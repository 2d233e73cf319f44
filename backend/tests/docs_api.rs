use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use budget_buddy_backend::docs;
use serde_json::Value;
use tower::ServiceExt;
use utoipa::OpenApi;

mod support;

#[test]
fn openapi_includes_auth_paths_and_bearer_scheme() {
    let openapi = docs::ApiDoc::openapi();
    let json = serde_json::to_value(&openapi).expect("serialize openapi");

    let paths = json
        .get("paths")
        .and_then(|v| v.as_object())
        .expect("paths object");
    for path in [
        "/api/auth/sign-up",
        "/api/auth/sign-in",
        "/api/auth/refresh",
        "/api/auth/logout",
        "/api/auth/me",
        "/api/expenses",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }

    let bearer = json
        .pointer("/components/securitySchemes/BearerAuth")
        .expect("BearerAuth scheme");
    assert_eq!(bearer.get("type").and_then(Value::as_str), Some("http"));
    assert_eq!(bearer.get("scheme").and_then(Value::as_str), Some("bearer"));
}

#[tokio::test]
async fn swagger_ui_and_health_respond() {
    let app = support::test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/docs")
                .body(Body::empty())
                .expect("build docs request"),
        )
        .await
        .expect("call swagger ui");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/api/docs/");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .expect("build openapi request"),
        )
        .await
        .expect("call openapi json");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("build health request"),
        )
        .await
        .expect("call health");
    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    assert_eq!(body["value"]["status"], "ok");
}
