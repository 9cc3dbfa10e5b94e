use crate::error::Result;
use crate::services::{HashtagService, PostService};
use crate::utils::pagination::PageQuery;
use crate::utils::response;
use actix_middleware::OptionalUserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<String>,
}

pub async fn trending(
    pool: web::Data<PgPool>,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse> {
    let hashtags = HashtagService::new((**pool).clone())
        .trending(query.limit.as_deref())
        .await?;
    Ok(response::ok(hashtags))
}

pub async fn hashtag_posts(
    pool: web::Data<PgPool>,
    name: web::Path<String>,
    viewer: OptionalUserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (posts, pagination) = PostService::new((**pool).clone())
        .hashtag_posts(&name, viewer.0, query.params())
        .await?;
    Ok(response::page(posts, pagination))
}
