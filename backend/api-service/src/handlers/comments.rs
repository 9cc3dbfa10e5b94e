use crate::error::Result;
use crate::services::CommentService;
use crate::utils::pagination::PageQuery;
use crate::utils::response;
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

pub async fn list_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (comments, pagination) = CommentService::new((**pool).clone())
        .list(*post_id, query.params())
        .await?;
    Ok(response::page(comments, pagination))
}

pub async fn create_comment(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    user_id: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = CommentService::new((**pool).clone())
        .create(*post_id, user_id.0, &req.content)
        .await?;
    Ok(response::created(comment))
}

pub async fn delete_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<i64>,
    user_id: UserId,
) -> Result<HttpResponse> {
    CommentService::new((**pool).clone())
        .delete(*comment_id, user_id.0)
        .await?;
    Ok(response::message("comment deleted successfully"))
}

/// `DELETE /posts/{id}/comments/{comment_id}`
pub async fn delete_post_comment(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let (_post_id, comment_id) = path.into_inner();
    CommentService::new((**pool).clone())
        .delete(comment_id, user_id.0)
        .await?;
    Ok(response::message("comment deleted successfully"))
}
