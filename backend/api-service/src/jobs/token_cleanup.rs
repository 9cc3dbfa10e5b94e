//! Token Cleanup Background Job
//!
//! Deletes expired refresh, password reset and email verification tokens,
//! and marks approved password reset requests past their expiry as expired.

use crate::db::token_repo::{self, OneTimeKind};
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Runs once per hour
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub refresh_tokens: u64,
    pub password_reset_tokens: u64,
    pub verification_tokens: u64,
    pub expired_requests: u64,
}

pub async fn start_token_cleanup(db: PgPool) {
    tracing::info!(
        "Starting token cleanup job (interval={}m)",
        CLEANUP_INTERVAL.as_secs() / 60
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
    loop {
        interval.tick().await;

        let started = Instant::now();
        match cleanup_expired_tokens(&db).await {
            Ok(report) => tracing::info!(
                refresh_tokens = report.refresh_tokens,
                password_reset_tokens = report.password_reset_tokens,
                verification_tokens = report.verification_tokens,
                expired_requests = report.expired_requests,
                duration_ms = started.elapsed().as_millis(),
                "Token cleanup completed"
            ),
            Err(e) => tracing::error!(error = %e, "Token cleanup failed"),
        }
    }
}

pub async fn cleanup_expired_tokens(db: &PgPool) -> Result<CleanupReport, sqlx::Error> {
    Ok(CleanupReport {
        refresh_tokens: token_repo::delete_expired_refresh_tokens(db).await?,
        password_reset_tokens: token_repo::delete_expired_one_time_tokens(
            db,
            OneTimeKind::PasswordReset,
        )
        .await?,
        verification_tokens: token_repo::delete_expired_one_time_tokens(
            db,
            OneTimeKind::EmailVerification,
        )
        .await?,
        expired_requests: token_repo::expire_stale_requests(db).await?,
    })
}
