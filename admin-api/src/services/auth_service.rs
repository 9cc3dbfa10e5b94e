use crypto_core::{jwt, password::verify_password};

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::Admin;

pub struct AuthService {
    db: Database,
}

impl AuthService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Check credentials of an admin account and issue a session token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(Admin, String)> {
        let admin: Admin = sqlx::query_as(
            r#"
            SELECT id, username, email, role, password_hash, last_login_at
            FROM users
            WHERE username = $1 AND role = 'admin' AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db.pg)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify_password(password, &admin.password_hash)
            .map_err(|e| AppError::Internal(e.into()))?;
        if !valid {
            tracing::warn!(username = %username, "Admin login failed");
            return Err(AppError::InvalidCredentials);
        }

        let token = jwt::generate_access_token(admin.id)?;

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(admin.id)
            .execute(&self.db.pg)
            .await?;

        tracing::info!(admin_id = admin.id, username = %admin.username, "Admin logged in");
        Ok((admin, token))
    }

    pub async fn find_admin(&self, user_id: i64) -> Result<Option<Admin>> {
        let admin = sqlx::query_as(
            r#"
            SELECT id, username, email, role, password_hash, last_login_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db.pg)
        .await?;
        Ok(admin)
    }
}
