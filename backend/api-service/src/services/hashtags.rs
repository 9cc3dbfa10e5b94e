use crate::db::hashtag_repo;
use crate::error::Result;
use crate::models::TrendingHashtag;
use sqlx::PgPool;

pub const DEFAULT_TRENDING_LIMIT: i64 = 10;
pub const MAX_TRENDING_LIMIT: i64 = 50;

pub struct HashtagService {
    pool: PgPool,
}

impl HashtagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn trending(&self, limit: Option<&str>) -> Result<Vec<TrendingHashtag>> {
        Ok(hashtag_repo::trending(&self.pool, trending_limit(limit)).await?)
    }
}

/// Default 10; values above 50 are capped, invalid values use the default
pub fn trending_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|l| l.parse::<i64>().ok()) {
        Some(l) if l > 0 => l.min(MAX_TRENDING_LIMIT),
        _ => DEFAULT_TRENDING_LIMIT,
    }
}
