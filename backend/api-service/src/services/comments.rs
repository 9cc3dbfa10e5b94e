use crate::db::comment_repo;
use crate::error::{AppError, Result};
use crate::models::CommentView;
use crate::services::PostService;
use crate::utils::pagination::{paginate, PageParams, Pagination};
use crate::utils::sanitize::sanitize_text;
use crate::utils::validation::validate_comment_content;
use sqlx::PgPool;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        post_id: i64,
        page: PageParams,
    ) -> Result<(Vec<CommentView>, Pagination)> {
        PostService::new(self.pool.clone())
            .ensure_exists(post_id)
            .await?;

        let rows =
            comment_repo::list_for_post(&self.pool, post_id, page.cursor, page.limit + 1).await?;
        let (rows, pagination) = paginate(rows, page.limit, |c| c.id);
        Ok((rows.into_iter().map(CommentView::from).collect(), pagination))
    }

    pub async fn create(&self, post_id: i64, user_id: i64, content: &str) -> Result<CommentView> {
        let content = validate_comment_content(content)?;
        PostService::new(self.pool.clone())
            .ensure_exists(post_id)
            .await?;

        let comment =
            comment_repo::create_comment(&self.pool, post_id, user_id, &sanitize_text(&content))
                .await?;
        tracing::info!(comment_id = comment.id, post_id, user_id, "Comment created");
        Ok(CommentView::from(comment))
    }

    pub async fn delete(&self, comment_id: i64, user_id: i64) -> Result<()> {
        let owner = comment_repo::find_owner(&self.pool, comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;

        if owner != user_id {
            return Err(AppError::Forbidden("unauthorized".to_string()));
        }

        comment_repo::soft_delete(&self.pool, comment_id).await?;
        tracing::info!(comment_id, user_id, "Comment deleted");
        Ok(())
    }
}
