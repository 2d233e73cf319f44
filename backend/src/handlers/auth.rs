use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppError,
    extractors::AppJson,
    middleware::auth::AuthenticatedUser,
    models::{
        user::{AuthResponse, LogoutResponse, SignInRequest, SignUpRequest, UserProfile, UserSummary},
        ApiResponse,
    },
    services::Session,
    state::AppState,
    utils::cookies::{
        build_refresh_cookie, clear_refresh_cookie, extract_cookie_value, REFRESH_COOKIE_NAME,
    },
};

pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserSummary>>), AppError> {
    let summary = state.auth.sign_up(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(summary))))
}

pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<Response, AppError> {
    let session = state
        .auth
        .sign_in(&payload.username, &payload.password)
        .await?;
    session_response(&state, session)
}

pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let token = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, REFRESH_COOKIE_NAME))
        .unwrap_or_default();
    let session = state.auth.refresh(&token).await?;
    session_response(&state, session)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Response, AppError> {
    let result = state.auth.logout(user.user_id).await?;
    let cookie = header_value(clear_refresh_cookie(&state.config))?;
    let body: Json<ApiResponse<LogoutResponse>> = Json(ApiResponse::new(result));
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile = state.auth.me(user.user_id).await?;
    Ok(Json(ApiResponse::new(profile)))
}

fn session_response(state: &AppState, session: Session) -> Result<Response, AppError> {
    let cookie = header_value(build_refresh_cookie(&session.refresh_token, &state.config))?;
    let body = Json(ApiResponse::new(AuthResponse {
        user: session.user,
        access_token: session.access_token,
    }));
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

fn header_value(value: String) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&value).map_err(|err| AppError::InternalServerError(err.into()))
}
