use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::AdminAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

impl UserStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(UserStatus::Pending),
            "approved" => Some(UserStatus::Approved),
            "rejected" => Some(UserStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
        }
    }

    /// Audit action recorded when a user is moved into this status
    pub fn audit_action(&self) -> AdminAction {
        match self {
            UserStatus::Approved => AdminAction::ApproveUser,
            UserStatus::Rejected => AdminAction::RejectUser,
            UserStatus::Pending => AdminAction::UserStatusChange,
        }
    }
}

/// User record as shown to administrators
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ManagedUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub header_url: Option<String>,
    pub website: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub email_verified: bool,
    pub status: String,
    pub role: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserWithPostCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: ManagedUser,
    pub post_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub post_count: i64,
    pub like_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentPost {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub user: ManagedUser,
    pub stats: UserStats,
    pub recent_posts: Vec<RecentPost>,
}
