use crate::error::Result;
use crate::services::posts::TimelineType;
use crate::services::PostService;
use crate::utils::pagination::PageQuery;
use crate::utils::response;
use actix_middleware::{OptionalUserId, UserId};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Deserialize)]
pub struct PostContentRequest {
    pub content: String,
}

pub async fn timeline(
    pool: web::Data<PgPool>,
    viewer: OptionalUserId,
    query: web::Query<TimelineQuery>,
) -> Result<HttpResponse> {
    let kind = TimelineType::parse(query.kind.as_deref());
    let (posts, pagination) = PostService::new((**pool).clone())
        .timeline(viewer.0, kind, query.page.params())
        .await?;
    Ok(response::page(posts, pagination))
}

pub async fn get_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    viewer: OptionalUserId,
) -> Result<HttpResponse> {
    let post = PostService::new((**pool).clone())
        .get_post(*post_id, viewer.0)
        .await?;
    Ok(response::ok(post))
}

pub async fn create_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<PostContentRequest>,
) -> Result<HttpResponse> {
    let post = PostService::new((**pool).clone())
        .create_post(user_id.0, &req.content)
        .await?;
    Ok(response::created(post))
}

pub async fn update_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
    req: web::Json<PostContentRequest>,
) -> Result<HttpResponse> {
    let post = PostService::new((**pool).clone())
        .update_post(*post_id, user_id.0, &req.content)
        .await?;
    Ok(response::ok(post))
}

pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    PostService::new((**pool).clone())
        .delete_post(*post_id, user_id.0)
        .await?;
    Ok(response::message("post deleted successfully"))
}
