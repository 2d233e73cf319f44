use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    state::AppState,
    types::UserId,
    utils::jwt::verify_access_token,
};

/// Identity taken from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_request(request.headers(), &state)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn authenticate_request(headers: &HeaderMap, state: &AppState) -> Result<AuthenticatedUser, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(AppError::invalid_credentials)?;

    let claims = verify_access_token(token, state.auth.token_settings()).map_err(|err| {
        tracing::debug!(error = %err, "Access token rejected");
        AppError::invalid_credentials()
    })?;
    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AppError::invalid_credentials())?;

    Ok(AuthenticatedUser { user_id })
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim())
    } else {
        None
    }
}
