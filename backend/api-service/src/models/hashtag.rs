use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrendingHashtag {
    pub id: i64,
    pub name: String,
    pub posts_count: i64,
}
