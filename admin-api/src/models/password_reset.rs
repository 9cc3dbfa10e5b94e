use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const RESET_PENDING: &str = "pending";

/// Reset request joined with the requesting user
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResetRequest {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub user_email: String,
    pub status: String,
    pub admin_approved_by: Option<i64>,
    pub admin_approved_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovedReset {
    pub token: String,
    pub reset_url: String,
    pub expires_at: DateTime<Utc>,
    pub email_template: String,
    pub user_email: String,
}
