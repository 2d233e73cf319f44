use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
    pub jti: String, // JWT ID
}

impl Claims {
    pub fn new(user_id: String, username: String, ttl_seconds: u64) -> Self {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);

        Self {
            sub: user_id,
            username,
            exp: now.saturating_add(ttl),
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Signing material and lifetimes for both token kinds.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

impl From<&Config> for TokenSettings {
    fn from(config: &Config) -> Self {
        Self {
            access_secret: config.jwt_access_secret.clone(),
            refresh_secret: config.jwt_refresh_secret.clone(),
            access_ttl_seconds: config.jwt_access_ttl,
            refresh_ttl_seconds: config.jwt_refresh_ttl,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn sign_token(claims: &Claims, secret: &str) -> anyhow::Result<String> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn issue_token_pair(
    user_id: &str,
    username: &str,
    settings: &TokenSettings,
) -> anyhow::Result<TokenPair> {
    let access = Claims::new(
        user_id.to_string(),
        username.to_string(),
        settings.access_ttl_seconds,
    );
    let refresh = Claims::new(
        user_id.to_string(),
        username.to_string(),
        settings.refresh_ttl_seconds,
    );

    Ok(TokenPair {
        access_token: sign_token(&access, &settings.access_secret)?,
        refresh_token: sign_token(&refresh, &settings.refresh_secret)?,
    })
}

/// Checks signature and expiry with no leeway.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

pub fn verify_access_token(
    token: &str,
    settings: &TokenSettings,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    verify_token(token, &settings.access_secret)
}

pub fn verify_refresh_token(
    token: &str,
    settings: &TokenSettings,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    verify_token(token, &settings.refresh_secret)
}
