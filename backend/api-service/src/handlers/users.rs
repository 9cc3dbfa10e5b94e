use crate::error::{AppError, Result};
use crate::models::user::ProfileUpdate;
use crate::services::{PostService, UserService};
use crate::utils::pagination::PageQuery;
use crate::utils::response;
use crate::utils::sanitize::sanitize_text;
use actix_middleware::{OptionalUserId, UserId};
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

/// Editable profile fields. Anything else in the body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub header_url: Option<String>,
    pub website: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub occupation: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_update(self) -> Result<ProfileUpdate> {
        let birth_date = match self.birth_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::ValidationError("invalid birth_date format (YYYY-MM-DD)".to_string())
            })?),
        };

        let clean = |v: Option<String>| v.map(|s| sanitize_text(&s));

        Ok(ProfileUpdate {
            display_name: clean(self.display_name),
            bio: clean(self.bio),
            avatar_url: self.avatar_url.map(|s| s.trim().to_string()),
            header_url: self.header_url.map(|s| s.trim().to_string()),
            website: self.website.map(|s| s.trim().to_string()),
            birth_date,
            occupation: clean(self.occupation),
        })
    }
}

pub async fn get_user(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    viewer: OptionalUserId,
) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let user = service.profile_by_username(&username, viewer.0).await?;
    Ok(response::ok(user))
}

pub async fn update_profile(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let update = req.into_inner().into_update()?;
    let service = UserService::new((**pool).clone());
    Ok(response::ok(service.update_profile(user_id.0, update).await?))
}

pub async fn user_posts(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    viewer: OptionalUserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let author_id = UserService::new((**pool).clone())
        .resolve_id(&username)
        .await?;

    let (posts, pagination) = PostService::new((**pool).clone())
        .user_posts(author_id, viewer.0, query.params())
        .await?;
    Ok(response::page(posts, pagination))
}

pub async fn followers(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (users, pagination) = UserService::new((**pool).clone())
        .followers(&username, query.params())
        .await?;
    Ok(response::page(users, pagination))
}

pub async fn following(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (users, pagination) = UserService::new((**pool).clone())
        .following(&username, query.params())
        .await?;
    Ok(response::page(users, pagination))
}

pub async fn follow(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    user_id: UserId,
) -> Result<HttpResponse> {
    UserService::new((**pool).clone())
        .follow(user_id.0, &username)
        .await?;
    Ok(response::message("followed successfully"))
}

pub async fn unfollow(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    user_id: UserId,
) -> Result<HttpResponse> {
    UserService::new((**pool).clone())
        .unfollow(user_id.0, &username)
        .await?;
    Ok(response::message("unfollowed successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_sanitizes_text() {
        let update = UpdateProfileRequest {
            display_name: Some("  <b>Bob</b> ".into()),
            birth_date: Some("1990-05-01".into()),
            ..Default::default()
        }
        .into_update()
        .unwrap();

        assert_eq!(update.display_name.as_deref(), Some("&lt;b&gt;Bob&lt;/b&gt;"));
        assert_eq!(update.birth_date, NaiveDate::from_ymd_opt(1990, 5, 1));
        assert!(update.bio.is_none());
    }

    #[test]
    fn test_profile_update_rejects_bad_date() {
        let result = UpdateProfileRequest {
            birth_date: Some("01/05/1990".into()),
            ..Default::default()
        }
        .into_update();
        assert!(result.is_err());
    }
}
