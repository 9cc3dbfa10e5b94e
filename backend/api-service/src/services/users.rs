/// Profiles and the follow graph
use crate::db::{follow_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{user::ProfileUpdate, PublicUser, User, UserSummary};
use crate::utils::pagination::{paginate, PageParams, Pagination};
use sqlx::PgPool;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found() -> AppError {
        AppError::NotFound("user not found".to_string())
    }

    async fn with_counts(&self, user: User) -> Result<PublicUser> {
        let (followers, following) = follow_repo::count_follows(&self.pool, user.id).await?;
        let mut public = PublicUser::from(user);
        public.followers_count = followers;
        public.following_count = following;
        Ok(public)
    }

    pub async fn profile_by_id(&self, user_id: i64) -> Result<PublicUser> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(Self::not_found)?;
        self.with_counts(user).await
    }

    /// Public profile. `is_following` / `is_followed_by` are set only when an
    /// authenticated viewer looks at someone else.
    pub async fn profile_by_username(
        &self,
        username: &str,
        viewer: Option<i64>,
    ) -> Result<PublicUser> {
        let user = user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(Self::not_found)?;
        let target_id = user.id;
        let mut public = self.with_counts(user).await?;

        if let Some(viewer_id) = viewer.filter(|v| *v != target_id) {
            public.is_following =
                Some(follow_repo::is_following(&self.pool, viewer_id, target_id).await?);
            public.is_followed_by =
                Some(follow_repo::is_following(&self.pool, target_id, viewer_id).await?);
        }

        Ok(public)
    }

    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<PublicUser> {
        let user = user_repo::update_profile(&self.pool, user_id, &update)
            .await?
            .ok_or_else(Self::not_found)?;
        tracing::info!(user_id, "Profile updated");
        self.with_counts(user).await
    }

    pub async fn resolve_id(&self, username: &str) -> Result<i64> {
        user_repo::find_id_by_username(&self.pool, username)
            .await?
            .ok_or_else(Self::not_found)
    }

    pub async fn follow(&self, follower_id: i64, username: &str) -> Result<()> {
        let target_id = self.resolve_id(username).await?;

        if target_id == follower_id {
            return Err(AppError::BadRequest("cannot follow yourself".to_string()));
        }
        if follow_repo::is_following(&self.pool, follower_id, target_id).await? {
            return Err(AppError::Conflict("already following".to_string()));
        }

        follow_repo::create_follow(&self.pool, follower_id, target_id)
            .await
            .map_err(|e| {
                if crate::db::is_unique_violation(&e) {
                    AppError::Conflict("already following".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        tracing::debug!(follower_id, target_id, "Followed user");
        Ok(())
    }

    pub async fn unfollow(&self, follower_id: i64, username: &str) -> Result<()> {
        let target_id = self.resolve_id(username).await?;

        if !follow_repo::delete_follow(&self.pool, follower_id, target_id).await? {
            return Err(AppError::NotFound("not following".to_string()));
        }
        Ok(())
    }

    pub async fn followers(
        &self,
        username: &str,
        page: PageParams,
    ) -> Result<(Vec<UserSummary>, Pagination)> {
        let user_id = self.resolve_id(username).await?;
        let rows =
            follow_repo::list_followers(&self.pool, user_id, page.cursor, page.limit + 1).await?;
        Ok(paginate(rows, page.limit, |u| u.id))
    }

    pub async fn following(
        &self,
        username: &str,
        page: PageParams,
    ) -> Result<(Vec<UserSummary>, Pagination)> {
        let user_id = self.resolve_id(username).await?;
        let rows =
            follow_repo::list_following(&self.pool, user_id, page.cursor, page.limit + 1).await?;
        Ok(paginate(rows, page.limit, |u| u.id))
    }
}
