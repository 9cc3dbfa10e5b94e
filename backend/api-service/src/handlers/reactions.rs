/// Like and bookmark endpoints
use crate::error::Result;
use crate::services::{PostService, ReactionService};
use crate::utils::pagination::PageQuery;
use crate::utils::response;
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

pub async fn like_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    ReactionService::new((**pool).clone())
        .like(*post_id, user_id.0)
        .await?;
    Ok(response::message("post liked successfully"))
}

pub async fn unlike_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    ReactionService::new((**pool).clone())
        .unlike(*post_id, user_id.0)
        .await?;
    Ok(response::message("post unliked successfully"))
}

pub async fn post_likes(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (users, pagination) = ReactionService::new((**pool).clone())
        .likers(*post_id, query.params())
        .await?;
    Ok(response::page(users, pagination))
}

pub async fn bookmark_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    ReactionService::new((**pool).clone())
        .bookmark(*post_id, user_id.0)
        .await?;
    Ok(response::message("post bookmarked successfully"))
}

pub async fn unbookmark_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    ReactionService::new((**pool).clone())
        .unbookmark(*post_id, user_id.0)
        .await?;
    Ok(response::message("bookmark removed successfully"))
}

pub async fn bookmarks(
    pool: web::Data<PgPool>,
    user_id: UserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (posts, pagination) = PostService::new((**pool).clone())
        .bookmarks(user_id.0, query.params())
        .await?;
    Ok(response::page(posts, pagination))
}
