/// Credential storage: refresh tokens, one-time reset and verification
/// tokens, and admin-mediated password reset requests.
use crate::models::{token::OneTimeToken, PasswordResetRequest, RefreshToken};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

// ============================================================================
// Refresh tokens
// ============================================================================

pub async fn insert_refresh_token(
    conn: &mut PgConnection,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_refresh_token(
    conn: &mut PgConnection,
    token_hash: &str,
) -> Result<Option<RefreshToken>, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(
        r#"
        SELECT id, user_id, token_hash, expires_at, revoked
        FROM refresh_tokens
        WHERE token_hash = $1
        FOR UPDATE
        "#,
    )
    .bind(token_hash)
    .fetch_optional(conn)
    .await
}

pub async fn revoke_refresh_token(
    conn: &mut PgConnection,
    token_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() WHERE token_hash = $1",
    )
    .bind(token_hash)
    .execute(conn)
    .await?;
    Ok(())
}

/// Returns the number of tokens revoked
pub async fn revoke_all_for_user(conn: &mut PgConnection, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW()
        WHERE user_id = $1 AND revoked = FALSE
        "#,
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_expired_refresh_tokens(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ============================================================================
// One-time tokens
// ============================================================================

/// Tables holding one-time tokens
#[derive(Debug, Clone, Copy)]
pub enum OneTimeKind {
    PasswordReset,
    EmailVerification,
}

impl OneTimeKind {
    fn table(self) -> &'static str {
        match self {
            OneTimeKind::PasswordReset => "password_reset_tokens",
            OneTimeKind::EmailVerification => "email_verification_tokens",
        }
    }
}

pub async fn insert_one_time_token(
    pool: &PgPool,
    kind: OneTimeKind,
    user_id: i64,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (user_id, token, expires_at) VALUES ($1, $2, $3)",
        kind.table()
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Unexpired token row
pub async fn find_one_time_token(
    conn: &mut PgConnection,
    kind: OneTimeKind,
    token: &str,
) -> Result<Option<OneTimeToken>, sqlx::Error> {
    let sql = format!(
        "SELECT id, user_id, expires_at FROM {} WHERE token = $1 AND expires_at > NOW()",
        kind.table()
    );
    sqlx::query_as::<_, OneTimeToken>(&sql)
        .bind(token)
        .fetch_optional(conn)
        .await
}

pub async fn delete_one_time_tokens_for_user(
    conn: &mut PgConnection,
    kind: OneTimeKind,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE user_id = $1", kind.table());
    sqlx::query(&sql).bind(user_id).execute(conn).await?;
    Ok(())
}

pub async fn delete_expired_one_time_tokens(
    pool: &PgPool,
    kind: OneTimeKind,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE expires_at < NOW()", kind.table());
    let result = sqlx::query(&sql).execute(pool).await?;
    Ok(result.rows_affected())
}

// ============================================================================
// Admin-mediated reset requests
// ============================================================================

/// Queue a request for an administrator. The stored token is a placeholder
/// until an admin approves the request.
pub async fn insert_reset_request(
    pool: &PgPool,
    user_id: i64,
    placeholder_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO password_reset_requests (user_id, token, status, expires_at)
        VALUES ($1, $2, 'pending', $3)
        "#,
    )
    .bind(user_id)
    .bind(placeholder_token)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Approved, unexpired request matching the token
pub async fn find_approved_request(
    conn: &mut PgConnection,
    token: &str,
) -> Result<Option<PasswordResetRequest>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetRequest>(
        r#"
        SELECT id, user_id, status, expires_at
        FROM password_reset_requests
        WHERE token = $1 AND status = 'approved' AND expires_at > NOW()
        FOR UPDATE
        "#,
    )
    .bind(token)
    .fetch_optional(conn)
    .await
}

pub async fn mark_request_used(conn: &mut PgConnection, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE password_reset_requests SET status = 'used', updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Approved requests past their expiry become `expired`
pub async fn expire_stale_requests(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE password_reset_requests SET status = 'expired', updated_at = NOW()
        WHERE status = 'approved' AND expires_at < NOW()
        "#,
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
