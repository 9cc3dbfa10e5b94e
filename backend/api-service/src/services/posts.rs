/// Post creation, retrieval and the timelines
use crate::db::{hashtag_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{PostRow, PostView};
use crate::utils::hashtag::extract_hashtags;
use crate::utils::pagination::{paginate, PageParams, Pagination};
use crate::utils::sanitize::sanitize_text;
use crate::utils::validation::validate_post_content;
use std::collections::HashMap;
use sqlx::PgPool;

/// Which posts the timeline contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineType {
    All,
    Following,
}

impl TimelineType {
    /// Unknown values fall back to `All`
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("following") => TimelineType::Following,
            _ => TimelineType::All,
        }
    }
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn not_found() -> AppError {
        AppError::NotFound("post not found".to_string())
    }

    /// Attach media and hashtags to a batch of rows
    pub async fn build_views(&self, rows: Vec<PostRow>) -> Result<Vec<PostView>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let mut media_by_post: HashMap<i64, Vec<_>> = HashMap::new();
        for media in post_repo::media_for_posts(&self.pool, &ids).await? {
            media_by_post.entry(media.post_id).or_default().push(media);
        }

        let mut tags_by_post: HashMap<i64, Vec<String>> = HashMap::new();
        for (post_id, name) in post_repo::hashtags_for_posts(&self.pool, &ids).await? {
            tags_by_post.entry(post_id).or_default().push(name);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let media = media_by_post.remove(&row.id).unwrap_or_default();
                let tags = tags_by_post.remove(&row.id).unwrap_or_default();
                PostView::from_row(row, media, tags)
            })
            .collect())
    }

    async fn page_of(
        &self,
        rows: Vec<PostRow>,
        limit: i64,
    ) -> Result<(Vec<PostView>, Pagination)> {
        let (rows, pagination) = paginate(rows, limit, |r| r.id);
        Ok((self.build_views(rows).await?, pagination))
    }

    pub async fn get_post(&self, post_id: i64, viewer: Option<i64>) -> Result<PostView> {
        let row = post_repo::find_post(&self.pool, post_id, viewer)
            .await?
            .ok_or_else(Self::not_found)?;

        self.build_views(vec![row])
            .await?
            .pop()
            .ok_or_else(Self::not_found)
    }

    /// Fails with 404 for missing posts and 403 for posts of other users
    pub async fn ensure_owner(&self, post_id: i64, user_id: i64) -> Result<()> {
        let owner = post_repo::find_owner(&self.pool, post_id)
            .await?
            .ok_or_else(Self::not_found)?;

        if owner != user_id {
            return Err(AppError::Forbidden("unauthorized".to_string()));
        }
        Ok(())
    }

    pub async fn ensure_exists(&self, post_id: i64) -> Result<()> {
        post_repo::find_owner(&self.pool, post_id)
            .await?
            .map(|_| ())
            .ok_or_else(Self::not_found)
    }

    pub async fn create_post(&self, user_id: i64, content: &str) -> Result<PostView> {
        let content = validate_post_content(content)?;
        let hashtags = extract_hashtags(&content);
        let stored = sanitize_text(&content);

        let mut tx = self.pool.begin().await?;
        let post_id = post_repo::insert_post(&mut tx, user_id, &stored).await?;
        hashtag_repo::attach_hashtags(&mut tx, post_id, &hashtags).await?;
        tx.commit().await?;

        tracing::info!(post_id, user_id, hashtags = hashtags.len(), "Post created");
        self.get_post(post_id, Some(user_id)).await
    }

    /// Replace the content and recompute hashtags
    pub async fn update_post(&self, post_id: i64, user_id: i64, content: &str) -> Result<PostView> {
        let content = validate_post_content(content)?;
        self.ensure_owner(post_id, user_id).await?;

        let hashtags = extract_hashtags(&content);
        let stored = sanitize_text(&content);

        let mut tx = self.pool.begin().await?;
        post_repo::update_content(&mut tx, post_id, &stored).await?;
        hashtag_repo::detach_all(&mut tx, post_id).await?;
        hashtag_repo::attach_hashtags(&mut tx, post_id, &hashtags).await?;
        tx.commit().await?;

        tracing::info!(post_id, user_id, "Post updated");
        self.get_post(post_id, Some(user_id)).await
    }

    pub async fn delete_post(&self, post_id: i64, user_id: i64) -> Result<()> {
        self.ensure_owner(post_id, user_id).await?;
        post_repo::soft_delete(&self.pool, post_id).await?;
        tracing::info!(post_id, user_id, "Post deleted");
        Ok(())
    }

    /// `Following` only narrows the timeline for authenticated viewers
    pub async fn timeline(
        &self,
        viewer: Option<i64>,
        kind: TimelineType,
        page: PageParams,
    ) -> Result<(Vec<PostView>, Pagination)> {
        let following_only = kind == TimelineType::Following && viewer.is_some();
        let rows = post_repo::timeline(
            &self.pool,
            viewer,
            following_only,
            page.cursor,
            page.limit + 1,
        )
        .await?;
        self.page_of(rows, page.limit).await
    }

    pub async fn user_posts(
        &self,
        author_id: i64,
        viewer: Option<i64>,
        page: PageParams,
    ) -> Result<(Vec<PostView>, Pagination)> {
        let rows =
            post_repo::user_posts(&self.pool, author_id, viewer, page.cursor, page.limit + 1)
                .await?;
        self.page_of(rows, page.limit).await
    }

    pub async fn bookmarks(
        &self,
        user_id: i64,
        page: PageParams,
    ) -> Result<(Vec<PostView>, Pagination)> {
        let rows =
            post_repo::bookmarked_posts(&self.pool, user_id, page.cursor, page.limit + 1).await?;
        self.page_of(rows, page.limit).await
    }

    /// Posts tagged with `name`; an unknown tag yields an empty page
    pub async fn hashtag_posts(
        &self,
        name: &str,
        viewer: Option<i64>,
        page: PageParams,
    ) -> Result<(Vec<PostView>, Pagination)> {
        let name = name.trim_start_matches('#').to_lowercase();
        let rows =
            post_repo::hashtag_posts(&self.pool, &name, viewer, page.cursor, page.limit + 1)
                .await?;
        self.page_of(rows, page.limit).await
    }
}
