use chrono::{Duration, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ApprovedReset, ResetRequest, RESET_PENDING};
use crate::utils::{filter_value, PageParams};

pub const APPROVED_TOKEN_TTL_HOURS: i64 = 24;

pub struct PasswordResetService {
    db: Database,
    frontend_url: String,
}

const REQUEST_COLUMNS: &str = r#"
    r.id, r.user_id, u.username, u.email AS user_email, r.status,
    r.admin_approved_by, r.admin_approved_at, r.expires_at, r.created_at
"#;

impl PasswordResetService {
    pub fn new(db: Database, frontend_url: impl Into<String>) -> Self {
        Self {
            db,
            frontend_url: frontend_url.into(),
        }
    }

    pub async fn list(
        &self,
        status: &Option<String>,
        page: PageParams,
    ) -> Result<(Vec<ResetRequest>, i64)> {
        let status = filter_value(status).map(String::from);

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM password_reset_requests r WHERE 1=1");
        if let Some(status) = &status {
            count.push(" AND r.status = ").push_bind(status.clone());
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.db.pg).await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM password_reset_requests r \
             JOIN users u ON u.id = r.user_id WHERE 1=1"
        ));
        if let Some(status) = status {
            query.push(" AND r.status = ").push_bind(status);
        }
        query
            .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let requests = query
            .build_query_as::<ResetRequest>()
            .fetch_all(&self.db.pg)
            .await?;

        Ok((requests, total))
    }

    pub async fn find(&self, request_id: i64) -> Result<ResetRequest> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM password_reset_requests r \
             JOIN users u ON u.id = r.user_id WHERE r.id = $1"
        );
        sqlx::query_as::<_, ResetRequest>(&sql)
            .bind(request_id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }

    /// Approve a pending request, replacing its token with a fresh 24 hour one
    pub async fn approve(&self, request_id: i64, admin_id: i64) -> Result<(ResetRequest, ApprovedReset)> {
        let request = self.find(request_id).await?;
        if request.status != RESET_PENDING {
            return Err(AppError::BadRequest("Request already processed".to_string()));
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::hours(APPROVED_TOKEN_TTL_HOURS);

        let updated = sqlx::query(
            r#"
            UPDATE password_reset_requests
            SET token = $2, status = 'approved', admin_approved_by = $3,
                admin_approved_at = NOW(), expires_at = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request_id)
        .bind(&token)
        .bind(admin_id)
        .bind(expires_at)
        .execute(&self.db.pg)
        .await?;

        // Another admin approved it in between
        if updated.rows_affected() == 0 {
            return Err(AppError::BadRequest("Request already processed".to_string()));
        }

        let reset_url = reset_url(&self.frontend_url, &token);
        let approved = ApprovedReset {
            email_template: email_template(&request.username, &reset_url),
            user_email: request.user_email.clone(),
            token,
            reset_url,
            expires_at,
        };

        Ok((request, approved))
    }
}

fn reset_url(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

fn email_template(username: &str, reset_url: &str) -> String {
    format!(
        "Hello {username},\n\n\
         Your password reset request has been approved.\n\
         Use the link below to set a new password (valid for {APPROVED_TOKEN_TTL_HOURS} hours):\n\n\
         {reset_url}\n\n\
         If you did not request this, you can ignore this email.\n\n\
         The SNS team"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_url() {
        assert_eq!(
            reset_url("https://sns.example", "abc"),
            "https://sns.example/reset-password?token=abc"
        );
        assert_eq!(
            reset_url("https://sns.example/", "abc"),
            "https://sns.example/reset-password?token=abc"
        );
    }

    #[test]
    fn test_email_template_mentions_user_and_link() {
        let body = email_template("alice", "https://sns.example/reset-password?token=t");
        assert!(body.starts_with("Hello alice,"));
        assert!(body.contains("https://sns.example/reset-password?token=t"));
        assert!(body.contains("24 hours"));
    }
}
