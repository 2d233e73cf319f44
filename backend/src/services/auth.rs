//! Credential & session manager: password hashing, token issuance, refresh
//! rotation and logout.
//!
//! Only the hash of the most recently issued refresh token is stored on the
//! user record, so each refresh token is single-use and a new sign-in
//! invalidates every earlier refresh token.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppError,
    models::user::{
        normalize_username, LogoutResponse, SignUpRequest, User, UserProfile, UserSummary,
    },
    repositories::UserRepository,
    types::UserId,
    utils::{
        jwt::{issue_token_pair, verify_refresh_token, TokenSettings},
        password::{HashError, SecretHasher, DERIVED_KEY_LEN, SALT_LEN},
    },
};

/// Result of a successful sign-in or refresh.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: SecretHasher,
    tokens: TokenSettings,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: SecretHasher, tokens: TokenSettings) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn token_settings(&self) -> &TokenSettings {
        &self.tokens
    }

    pub async fn sign_up(&self, payload: SignUpRequest) -> Result<UserSummary, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        if self.users.find_by_username(&payload.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = self.hash_secret(payload.password).await?;
        // The unique index still decides if two sign-ups race past the lookup.
        let created = self
            .users
            .create(&User::new(payload.username, password_hash))
            .await?;

        tracing::info!(user_id = %created.id, username = %created.username, "User signed up");
        Ok(UserSummary::from(&created))
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let username = normalize_username(username);
        if username.is_empty() || password.is_empty() {
            return Err(reject("blank_credentials"));
        }

        let Some(user) = self.users.find_by_username(&username).await? else {
            // Same derivation cost as the known-user path.
            let _ = self
                .verify_secret(password.to_string(), unknown_user_hash())
                .await;
            return Err(reject("unknown_user"));
        };

        match self
            .verify_secret(password.to_string(), user.password_hash.clone())
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(reject("password_mismatch")),
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err, "Stored password hash unusable");
                return Err(reject("password_hash_unusable"));
            }
        }

        let session = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(session)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AppError> {
        if refresh_token.is_empty() {
            return Err(reject("missing_refresh_token"));
        }

        let claims = verify_refresh_token(refresh_token, &self.tokens)
            .map_err(|_| reject("refresh_token_invalid"))?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| reject("refresh_subject_invalid"))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| reject("refresh_subject_unknown"))?;
        let stored_hash = user
            .refresh_token_hash
            .clone()
            .ok_or_else(|| reject("no_active_session"))?;

        let matches = self
            .verify_secret(refresh_token.to_string(), stored_hash)
            .await
            .unwrap_or(false);
        if !matches {
            tracing::warn!(user_id = %user.id, "Refresh token does not match the active session");
            return Err(reject("refresh_token_rotated"));
        }

        let session = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "Session refreshed");
        Ok(session)
    }

    /// Ends the session; succeeds whether or not one was active.
    pub async fn logout(&self, user_id: UserId) -> Result<LogoutResponse, AppError> {
        self.users.update_refresh_token_hash(user_id, None).await?;
        tracing::info!(%user_id, "User logged out");
        Ok(LogoutResponse { success: true })
    }

    pub async fn me(&self, user_id: UserId) -> Result<UserProfile, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| reject("profile_subject_unknown"))?;
        Ok(UserProfile::from(&user))
    }

    /// Issues a token pair and stores the hash of its refresh token, replacing
    /// whatever session the user had before.
    async fn start_session(&self, user: &User) -> Result<Session, AppError> {
        let user_id = user.id.to_string();
        let pair = issue_token_pair(&user_id, &user.username, &self.tokens)?;
        let refresh_hash = self.hash_secret(pair.refresh_token.clone()).await?;

        self.users
            .update_refresh_token_hash(user.id, Some(refresh_hash))
            .await?
            .ok_or_else(|| reject("user_vanished"))?;

        Ok(Session {
            user: UserProfile::from(user),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    async fn hash_secret(&self, secret: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        Ok(hashed)
    }

    async fn verify_secret(&self, candidate: String, stored: String) -> Result<bool, HashError> {
        let hasher = self.hasher.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored)).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "Hash verification task failed");
                Ok(false)
            }
        }
    }
}

fn reject(reason: &'static str) -> AppError {
    tracing::warn!(reason, "Rejected credentials");
    AppError::invalid_credentials()
}

fn unknown_user_hash() -> String {
    format!(
        "{}:{}",
        hex::encode([0u8; SALT_LEN]),
        hex::encode([0u8; DERIVED_KEY_LEN])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::INVALID_CREDENTIALS, repositories::memory::InMemoryUserRepository,
        repositories::MockUserRepository,
        utils::jwt::{sign_token, verify_access_token, Claims},
    };

    fn settings() -> TokenSettings {
        TokenSettings {
            access_secret: "test-access-secret".into(),
            refresh_secret: "test-refresh-secret".into(),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 604_800,
        }
    }

    fn service_with(users: Arc<dyn UserRepository>) -> AuthService {
        AuthService::new(
            users,
            SecretHasher::new(1024, 1).expect("hasher"),
            settings(),
        )
    }

    fn service() -> (AuthService, Arc<InMemoryUserRepository>) {
        let users = Arc::new(InMemoryUserRepository::new());
        (service_with(users.clone()), users)
    }

    fn credentials(username: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    fn assert_invalid_credentials(err: AppError) {
        match err {
            AppError::Unauthorized(message) => assert_eq!(message, INVALID_CREDENTIALS),
            other => panic!("expected invalid credentials, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_returns_same_user() {
        let (auth, _) = service();
        let summary = auth
            .sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        assert_eq!(summary.username, "alice");

        let session = auth.sign_in("alice", "password123").await.expect("sign in");
        assert_eq!(session.user.id, summary.id);
        assert_eq!(session.user.username, "alice");

        let claims = verify_access_token(&session.access_token, auth.token_settings())
            .expect("access token verifies");
        assert_eq!(claims.sub, summary.id.to_string());
        assert_eq!(auth.me(summary.id).await.expect("me").username, "alice");
    }

    #[tokio::test]
    async fn sign_up_normalizes_username_and_never_stores_raw_password() {
        let (auth, users) = service();
        let summary = auth
            .sign_up(credentials("  Alice ", "password123"))
            .await
            .expect("sign up");
        assert_eq!(summary.username, "alice");

        let stored = users
            .find_by_username("alice")
            .await
            .unwrap()
            .expect("stored");
        assert!(!stored.password_hash.contains("password123"));
        assert!(stored.password_hash.contains(':'));
        assert!(stored.refresh_token_hash.is_none());

        auth.sign_in("ALICE", "password123")
            .await
            .expect("case-insensitive sign in");
    }

    #[tokio::test]
    async fn sign_up_reports_validation_errors() {
        let (auth, users) = service();
        for (username, password) in [
            ("", "password123"),
            ("   ", "password123"),
            ("al", "password123"),
            ("al ice", "password123"),
            ("alice", "short"),
        ] {
            let err = auth
                .sign_up(credentials(username, password))
                .await
                .expect_err("invalid input should fail");
            assert!(
                matches!(err, AppError::Validation(_)),
                "{username:?}/{password:?} gave {err:?}"
            );
        }
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicate_username() {
        let (auth, _) = service();
        auth.sign_up(credentials("alice", "password123"))
            .await
            .expect("first");
        let err = auth
            .sign_up(credentials("Alice", "different-password"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let (auth, _) = service();
        auth.sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");

        assert_invalid_credentials(auth.sign_in("alice", "wrong-password").await.unwrap_err());
        assert_invalid_credentials(auth.sign_in("nobody", "password123").await.unwrap_err());
        assert_invalid_credentials(auth.sign_in("", "password123").await.unwrap_err());
        assert_invalid_credentials(auth.sign_in("alice", "").await.unwrap_err());
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_treated_as_wrong_password() {
        let (auth, users) = service();
        users
            .create(&User::new("mallory".into(), "not-a-valid-hash".into()))
            .await
            .expect("seed");
        assert_invalid_credentials(auth.sign_in("mallory", "password123").await.unwrap_err());
    }

    #[tokio::test]
    async fn sign_in_stores_only_a_hash_of_the_refresh_token() {
        let (auth, users) = service();
        let summary = auth
            .sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let session = auth.sign_in("alice", "password123").await.expect("sign in");

        let stored = users.find_by_id(summary.id).await.unwrap().expect("user");
        let hash = stored.refresh_token_hash.expect("session active");
        assert_ne!(hash, session.refresh_token);
        assert!(!hash.contains(&session.refresh_token));
    }

    #[tokio::test]
    async fn refresh_rotates_and_old_token_is_single_use() {
        let (auth, _) = service();
        auth.sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let first = auth.sign_in("alice", "password123").await.expect("sign in");

        let second = auth.refresh(&first.refresh_token).await.expect("refresh");
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_eq!(second.user, first.user);

        assert_invalid_credentials(auth.refresh(&first.refresh_token).await.unwrap_err());
        auth.refresh(&second.refresh_token)
            .await
            .expect("latest token still valid");
    }

    #[tokio::test]
    async fn new_sign_in_invalidates_previous_refresh_token() {
        let (auth, _) = service();
        auth.sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let first = auth.sign_in("alice", "password123").await.expect("first");
        let _second = auth.sign_in("alice", "password123").await.expect("second");
        assert_invalid_credentials(auth.refresh(&first.refresh_token).await.unwrap_err());
    }

    #[tokio::test]
    async fn refresh_rejects_empty_forged_and_access_tokens() {
        let (auth, _) = service();
        auth.sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let session = auth.sign_in("alice", "password123").await.expect("sign in");

        assert_invalid_credentials(auth.refresh("").await.unwrap_err());
        assert_invalid_credentials(auth.refresh("not.a.jwt").await.unwrap_err());
        assert_invalid_credentials(auth.refresh(&session.access_token).await.unwrap_err());
    }

    #[tokio::test]
    async fn refresh_rejects_token_for_unknown_subject() {
        let (auth, users) = service();
        let pair = issue_token_pair(&UserId::new().to_string(), "ghost", auth.token_settings())
            .expect("issue");

        assert_invalid_credentials(auth.refresh(&pair.refresh_token).await.unwrap_err());
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn refresh_rejects_expired_token() {
        let (auth, _) = service();
        let summary = auth
            .sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let mut claims = Claims::new(summary.id.to_string(), "alice".into(), 60);
        claims.iat -= 120;
        claims.exp -= 120;
        let token = sign_token(&claims, &auth.token_settings().refresh_secret).expect("sign");

        assert_invalid_credentials(auth.refresh(&token).await.unwrap_err());
    }

    #[tokio::test]
    async fn refresh_with_malformed_stored_hash_is_rejected() {
        let (auth, users) = service();
        let summary = auth
            .sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let session = auth.sign_in("alice", "password123").await.expect("sign in");
        users
            .update_refresh_token_hash(summary.id, Some("not-a-hash".into()))
            .await
            .expect("update")
            .expect("user exists");

        assert_invalid_credentials(auth.refresh(&session.refresh_token).await.unwrap_err());
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_blocks_refresh() {
        let (auth, users) = service();
        let summary = auth
            .sign_up(credentials("alice", "password123"))
            .await
            .expect("sign up");
        let session = auth.sign_in("alice", "password123").await.expect("sign in");

        assert!(auth.logout(summary.id).await.expect("logout").success);
        assert!(auth.logout(summary.id).await.expect("second logout").success);
        let stored = users.find_by_id(summary.id).await.unwrap().expect("user");
        assert!(!stored.has_active_session());

        assert_invalid_credentials(auth.refresh(&session.refresh_token).await.unwrap_err());
    }

    #[tokio::test]
    async fn logout_of_unknown_user_succeeds() {
        let (auth, _) = service();
        assert!(auth.logout(UserId::new()).await.expect("logout").success);
    }

    #[tokio::test]
    async fn me_rejects_unknown_user() {
        let (auth, _) = service();
        assert_invalid_credentials(auth.me(UserId::new()).await.unwrap_err());
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal_errors() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_username()
            .returning(|_| Err(AppError::InternalServerError(anyhow::anyhow!("db down"))));
        let auth = service_with(Arc::new(mock));

        let err = auth.sign_in("alice", "password123").await.unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[tokio::test]
    async fn unique_index_conflict_on_insert_maps_to_conflict() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_username().returning(|_| Ok(None));
        mock.expect_create()
            .times(1)
            .returning(|_| Err(AppError::Conflict("Username already exists".into())));
        let auth = service_with(Arc::new(mock));

        let err = auth
            .sign_up(credentials("alice", "password123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
