//! Models that represent users, authentication payloads, and session responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::{types::UserId, validation::rules};

#[derive(Debug, Clone, FromRow)]
/// Database representation of an account. Never serialized to clients.
pub struct User {
    /// Unique identifier for the user.
    pub id: UserId,
    /// Trimmed, lower-cased, unique login name.
    pub username: String,
    /// `hex(salt):hex(key)` of the password.
    pub password_hash: String,
    /// `hex(salt):hex(key)` of the latest refresh token; `None` when logged out.
    pub refresh_token_hash: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username,
            password_hash,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_active_session(&self) -> bool {
        self.refresh_token_hash.is_some()
    }
}

/// Lower-cases and trims a username the same way for sign-up and sign-in.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
/// Credentials submitted to create an account.
pub struct SignUpRequest {
    #[validate(
        length(min = 3, message = "Username must be at least 3 characters"),
        custom(function = "rules::validate_username")
    )]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[serde(default)]
    pub password: String,
}

impl SignUpRequest {
    pub fn normalized(self) -> Self {
        Self {
            username: normalize_username(&self.username),
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct SignInRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Account details returned after sign-up.
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// Identity of the signed-in user.
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Body returned by sign-in and refresh. The refresh token travels in a cookie.
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
/// Logout acknowledgement.
pub struct LogoutResponse {
    pub success: bool,
}
