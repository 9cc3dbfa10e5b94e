use super::{Media, UserSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Post joined with its author and per-viewer flags
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

/// Post as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
    pub media: Vec<Media>,
    pub hashtag_names: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

impl PostView {
    pub fn from_row(row: PostRow, media: Vec<Media>, hashtag_names: Vec<String>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: UserSummary {
                id: row.user_id,
                username: row.username,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
                bio: row.bio,
            },
            media,
            hashtag_names,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            is_liked: row.is_liked,
            is_bookmarked: row.is_bookmarked,
        }
    }
}
