use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";

/// Account row. Never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
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
    pub followers_count: i64,
    pub following_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_followed_by: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            display_name: u.display_name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            header_url: u.header_url,
            website: u.website,
            birth_date: u.birth_date,
            occupation: u.occupation,
            email_verified: u.email_verified,
            followers_count: 0,
            following_count: 0,
            is_following: None,
            is_followed_by: None,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Author block embedded in posts, comments and user lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Fields a user may change on their own profile; `None` leaves a field as is
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub header_url: Option<String>,
    pub website: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<String>,
}
