use crate::db::token_repo::{self, OneTimeKind};
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::EmailService;
use chrono::{Duration, Utc};
use crypto_core::token::generate_hex_token;
use sqlx::PgPool;

pub const VERIFICATION_TOKEN_EXPIRY_HOURS: i64 = 24;

pub struct EmailVerificationService {
    pool: PgPool,
    email: EmailService,
}

impl EmailVerificationService {
    pub fn new(pool: PgPool, email: EmailService) -> Self {
        Self { pool, email }
    }

    /// Store a fresh 24 hour token and mail the link
    pub async fn send_for_user(&self, user: &User) -> Result<()> {
        let token = generate_hex_token();
        token_repo::insert_one_time_token(
            &self.pool,
            OneTimeKind::EmailVerification,
            user.id,
            &token,
            Utc::now() + Duration::hours(VERIFICATION_TOKEN_EXPIRY_HOURS),
        )
        .await?;

        self.email.send_verification_email(&user.email, &token).await
    }

    pub async fn verify(&self, token: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let stored =
            token_repo::find_one_time_token(&mut tx, OneTimeKind::EmailVerification, token.trim())
                .await?
                .ok_or_else(|| AppError::BadRequest("invalid or expired token".to_string()))?;

        user_repo::set_email_verified(&mut tx, stored.user_id).await?;
        token_repo::delete_one_time_tokens_for_user(
            &mut tx,
            OneTimeKind::EmailVerification,
            stored.user_id,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = stored.user_id, "Email verified");
        Ok(())
    }

    pub async fn resend(&self, user_id: i64) -> Result<()> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        if user.email_verified {
            return Err(AppError::BadRequest("email already verified".to_string()));
        }

        self.send_for_user(&user).await
    }
}
