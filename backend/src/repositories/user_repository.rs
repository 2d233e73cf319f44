//! User record store.
//!
//! The [`UserRepository`] trait is the only way the credential manager touches
//! persisted accounts, which keeps it mockable with mockall and lets tests run
//! against [`crate::repositories::memory::InMemoryUserRepository`].

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::User;
use crate::types::UserId;

const USER_COLUMNS: &str =
    "id, username, password_hash, refresh_token_hash, created_at, updated_at";

/// Repository trait for User operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by (already normalized) username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    /// Insert a new user. A duplicate username yields `AppError::Conflict`.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Replace the stored refresh-token hash in a single atomic write.
    /// Returns `None` when the user does not exist.
    async fn update_refresh_token_hash(
        &self,
        id: UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<Option<User>, AppError>;
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let query = format!(
            "INSERT INTO users (id, username, password_hash, refresh_token_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.refresh_token_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::Conflict("Username already exists".to_string())
                }
                other => other.into(),
            })
    }

    async fn update_refresh_token_hash(
        &self,
        id: UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<Option<User>, AppError> {
        let query = format!(
            "UPDATE users SET refresh_token_hash = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(refresh_token_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
