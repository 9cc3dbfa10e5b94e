/// Self-service and admin-approved password resets
use crate::db::token_repo::{self, OneTimeKind};
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::services::EmailService;
use crate::utils::validation::validate_password;
use chrono::{Duration, Utc};
use crypto_core::password::hash_password;
use crypto_core::token::generate_hex_token;
use sqlx::PgPool;

pub const RESET_TOKEN_EXPIRY_HOURS: i64 = 1;
/// Lifetime of a queued admin request
pub const RESET_REQUEST_EXPIRY_HOURS: i64 = 24;

pub struct PasswordResetService {
    pool: PgPool,
    email: EmailService,
}

impl PasswordResetService {
    pub fn new(pool: PgPool, email: EmailService) -> Self {
        Self { pool, email }
    }

    /// Succeeds whether or not the address belongs to an account
    pub async fn request_reset(&self, email: &str) -> Result<()> {
        let Some(user) = user_repo::find_by_email(&self.pool, email.trim()).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_hex_token();
        let now = Utc::now();
        token_repo::insert_one_time_token(
            &self.pool,
            OneTimeKind::PasswordReset,
            user.id,
            &token,
            now + Duration::hours(RESET_TOKEN_EXPIRY_HOURS),
        )
        .await?;

        token_repo::insert_reset_request(
            &self.pool,
            user.id,
            &generate_hex_token(),
            now + Duration::hours(RESET_REQUEST_EXPIRY_HOURS),
        )
        .await?;

        tracing::info!(user_id = user.id, "Password reset requested");

        if let Err(e) = self.email.send_password_reset_email(&user.email, &token).await {
            tracing::warn!(user_id = user.id, error = %e, "Failed to send password reset email");
        }
        Ok(())
    }

    /// Set a new password from an emailed token or an admin-approved request
    /// token. Every refresh token of the user is revoked.
    pub async fn confirm_reset(&self, token: &str, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let invalid = || AppError::BadRequest("invalid or expired token".to_string());

        if token.trim().is_empty() {
            return Err(invalid());
        }

        let mut tx = self.pool.begin().await?;

        let user_id = match token_repo::find_one_time_token(&mut tx, OneTimeKind::PasswordReset, token)
            .await?
        {
            Some(t) => t.user_id,
            None => {
                let request = token_repo::find_approved_request(&mut tx, token)
                    .await?
                    .ok_or_else(invalid)?;
                token_repo::mark_request_used(&mut tx, request.id).await?;
                request.user_id
            }
        };

        let password_hash = hash_password(new_password)?;
        user_repo::update_password(&mut tx, user_id, &password_hash).await?;
        token_repo::delete_one_time_tokens_for_user(&mut tx, OneTimeKind::PasswordReset, user_id)
            .await?;
        let revoked = token_repo::revoke_all_for_user(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(user_id, revoked, "Password reset completed");
        Ok(())
    }
}
