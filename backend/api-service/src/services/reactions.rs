/// Likes and bookmarks
use crate::db::{bookmark_repo, like_repo};
use crate::error::{AppError, Result};
use crate::models::UserSummary;
use crate::services::PostService;
use crate::utils::pagination::{paginate, PageParams, Pagination};
use sqlx::PgPool;

pub struct ReactionService {
    pool: PgPool,
    posts: PostService,
}

impl ReactionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            posts: PostService::new(pool.clone()),
            pool,
        }
    }

    pub async fn like(&self, post_id: i64, user_id: i64) -> Result<()> {
        self.posts.ensure_exists(post_id).await?;
        if !like_repo::create_like(&self.pool, post_id, user_id).await? {
            return Err(AppError::Conflict("already liked".to_string()));
        }
        Ok(())
    }

    pub async fn unlike(&self, post_id: i64, user_id: i64) -> Result<()> {
        if !like_repo::delete_like(&self.pool, post_id, user_id).await? {
            return Err(AppError::NotFound("like not found".to_string()));
        }
        Ok(())
    }

    pub async fn likers(
        &self,
        post_id: i64,
        page: PageParams,
    ) -> Result<(Vec<UserSummary>, Pagination)> {
        self.posts.ensure_exists(post_id).await?;
        let rows = like_repo::list_likers(&self.pool, post_id, page.cursor, page.limit + 1).await?;
        Ok(paginate(rows, page.limit, |u| u.id))
    }

    pub async fn bookmark(&self, post_id: i64, user_id: i64) -> Result<()> {
        self.posts.ensure_exists(post_id).await?;
        bookmark_repo::create_bookmark(&self.pool, user_id, post_id).await?;
        Ok(())
    }

    pub async fn unbookmark(&self, post_id: i64, user_id: i64) -> Result<()> {
        bookmark_repo::delete_bookmark(&self.pool, user_id, post_id).await?;
        Ok(())
    }
}
