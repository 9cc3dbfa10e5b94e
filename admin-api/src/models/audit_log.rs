use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Row of `admin_logs` with the admin and target usernames resolved
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminLog {
    pub id: i64,
    pub admin_id: i64,
    pub admin_username: String,
    pub action: String,
    pub target_user_id: Option<i64>,
    pub target_username: Option<String>,
    pub details: String,
    pub ip: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateAdminLog<'a> {
    pub admin_id: i64,
    pub admin_username: &'a str,
    pub action: AdminAction,
    pub target_user_id: Option<i64>,
    pub target_username: Option<&'a str>,
    pub details: String,
    pub ip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ApproveUser,
    RejectUser,
    UserStatusChange,
    PasswordResetApprove,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::ApproveUser => "approve_user",
            AdminAction::RejectUser => "reject_user",
            AdminAction::UserStatusChange => "user_status_change",
            AdminAction::PasswordResetApprove => "password_reset_approve",
        }
    }
}
