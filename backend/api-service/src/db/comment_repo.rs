use crate::models::Comment;
use sqlx::PgPool;

pub async fn create_comment(
    pool: &PgPool,
    post_id: i64,
    user_id: i64,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        WITH c AS (
            INSERT INTO comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, content, created_at, updated_at
        )
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, c.updated_at,
               u.username, u.display_name, u.avatar_url, u.bio
        FROM c
        JOIN users u ON u.id = c.user_id
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Comments of a post, newest first
pub async fn list_for_post(
    pool: &PgPool,
    post_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, c.updated_at,
               u.username, u.display_name, u.avatar_url, u.bio
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
          AND c.deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR c.id < $2)
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT $3
        "#,
    )
    .bind(post_id)
    .bind(cursor)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_owner(pool: &PgPool, comment_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM comments WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await
}

pub async fn soft_delete(pool: &PgPool, comment_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE comments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}
