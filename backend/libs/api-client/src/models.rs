use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// `{"data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// A page of results with cursor information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub has_more: bool,
    /// Pass back as `cursor` to fetch the next page; `None` once exhausted
    pub next_cursor: Option<String>,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
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
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub is_following: Option<bool>,
    #[serde(default)]
    pub is_followed_by: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub post_id: i64,
    pub media_type: String,
    pub media_url: String,
    pub file_size: i64,
    pub duration: Option<i32>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub hashtag_names: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: i64,
    pub name: String,
    pub posts_count: i64,
}

/// Result of register, login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    /// Access token, also delivered as the `access_token` cookie
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimelineType {
    #[default]
    All,
    /// Posts by followed users and the viewer
    Following,
}

impl TimelineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineType::All => "all",
            TimelineType::Following => "following",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Editable profile fields; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_with_exhausted_cursor() {
        let page: Page<UserSummary> = serde_json::from_value(json!({
            "data": [{"id": 1, "username": "alice", "display_name": null,
                      "avatar_url": null, "bio": null}],
            "pagination": {"has_more": false, "next_cursor": null, "limit": 20}
        }))
        .unwrap();

        assert_eq!(page.data[0].username, "alice");
        assert!(!page.pagination.has_more);
        assert_eq!(page.pagination.next_cursor, None);
    }

    #[test]
    fn test_post_tolerates_missing_viewer_flags() {
        let post: Post = serde_json::from_value(json!({
            "id": 9,
            "user_id": 1,
            "content": "hello #rust",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
            "user": {"id": 1, "username": "alice", "display_name": null,
                     "avatar_url": null, "bio": null},
            "likes_count": 2,
            "comments_count": 0
        }))
        .unwrap();

        assert!(post.media.is_empty());
        assert!(!post.is_liked);
        assert_eq!(post.likes_count, 2);
    }

    #[test]
    fn test_profile_update_sends_only_set_fields() {
        let update = ProfileUpdate {
            bio: Some("hi".into()),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 31),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"bio": "hi", "birth_date": "1990-01-31"})
        );
    }

    #[test]
    fn test_timeline_type() {
        assert_eq!(TimelineType::default().as_str(), "all");
        assert_eq!(TimelineType::Following.as_str(), "following");
    }
}
