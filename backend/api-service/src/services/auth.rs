/// Account registration, login and refresh-token sessions
use crate::db::{token_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{user::STATUS_APPROVED, user::STATUS_PENDING, PublicUser, User};
use crate::services::{EmailVerificationService, UserService};
use crate::utils::validation::{validate_email, validate_password, validate_username};
use chrono::{Duration, Utc};
use crypto_core::hash::hash_token;
use crypto_core::password::{hash_password, verify_password};
use crypto_core::{jwt, token::generate_refresh_token};
use sqlx::{PgConnection, PgPool};

pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Tokens handed to the client after a successful authentication
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    pool: PgPool,
    auto_approve_users: bool,
}

impl AuthService {
    pub fn new(pool: PgPool, auto_approve_users: bool) -> Self {
        Self {
            pool,
            auto_approve_users,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
        verification: &EmailVerificationService,
    ) -> Result<AuthSession> {
        let email = validate_email(email)?;
        validate_password(password)?;
        let username = validate_username(username)?;

        if user_repo::email_exists(&self.pool, &email).await? {
            return Err(AppError::Conflict("email already exists".to_string()));
        }
        if user_repo::username_exists(&self.pool, &username).await? {
            return Err(AppError::Conflict("username already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let status = if self.auto_approve_users {
            STATUS_APPROVED
        } else {
            STATUS_PENDING
        };

        let user = user_repo::create_user(&self.pool, &email, &username, &password_hash, status)
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration
                if crate::db::is_unique_violation(&e) {
                    AppError::Conflict("email or username already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        tracing::info!(user_id = user.id, status, "User registered");

        if let Err(e) = verification.send_for_user(&user).await {
            tracing::warn!(user_id = user.id, error = %e, "Failed to send verification email");
        }

        self.start_session(user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let invalid = || AppError::Unauthorized("invalid email or password".to_string());

        let user = user_repo::find_by_email(&self.pool, email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(invalid());
        }

        tracing::info!(user_id = user.id, "User logged in");
        self.start_session(user).await
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// revoked in the same transaction.
    pub async fn refresh(&self, raw_token: &str) -> Result<AuthSession> {
        let invalid = || AppError::Unauthorized("invalid or expired refresh token".to_string());

        let token_hash = hash_token(raw_token);
        let mut tx = self.pool.begin().await?;

        let stored = token_repo::find_refresh_token(&mut tx, &token_hash)
            .await?
            .filter(|t| t.is_valid())
            .ok_or_else(invalid)?;

        let user = user_repo::find_by_id(&self.pool, stored.user_id)
            .await?
            .ok_or_else(invalid)?;

        token_repo::revoke_refresh_token(&mut tx, &token_hash).await?;
        let refresh_token = issue_refresh_token(&mut tx, user.id).await?;
        tx.commit().await?;

        let access_token = jwt::generate_access_token(user.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(AuthSession {
            user: PublicUser::from(user),
            access_token,
            refresh_token,
        })
    }

    /// Revoke the presented refresh token, if any. Unknown tokens are ignored.
    pub async fn logout(&self, raw_token: Option<&str>) -> Result<()> {
        if let Some(raw) = raw_token.filter(|t| !t.is_empty()) {
            let mut conn = self.pool.acquire().await?;
            token_repo::revoke_refresh_token(&mut conn, &hash_token(raw)).await?;
        }
        Ok(())
    }

    pub async fn revoke_all(&self, user_id: i64) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        let revoked = token_repo::revoke_all_for_user(&mut conn, user_id).await?;
        tracing::info!(user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    /// Current user with follower counts
    pub async fn me(&self, user_id: i64) -> Result<PublicUser> {
        UserService::new(self.pool.clone())
            .profile_by_id(user_id)
            .await
    }

    async fn start_session(&self, user: User) -> Result<AuthSession> {
        let access_token = jwt::generate_access_token(user.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let mut conn = self.pool.acquire().await?;
        let refresh_token = issue_refresh_token(&mut conn, user.id).await?;

        Ok(AuthSession {
            user: PublicUser::from(user),
            access_token,
            refresh_token,
        })
    }
}

/// Create and persist a new refresh token, returning the raw value
async fn issue_refresh_token(conn: &mut PgConnection, user_id: i64) -> Result<String> {
    let raw = generate_refresh_token();
    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);
    token_repo::insert_refresh_token(conn, user_id, &hash_token(&raw), expires_at).await?;
    Ok(raw)
}
