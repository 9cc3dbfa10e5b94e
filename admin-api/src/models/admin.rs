use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const ADMIN_ROLE: &str = "admin";

/// A row of `users` with `role = 'admin'`, as seen by the admin API
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Admin {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Identity attached to every request under `/admin/api`
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub id: i64,
    pub username: String,
}
