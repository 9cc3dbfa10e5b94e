use crate::models::UserSummary;
use sqlx::PgPool;

/// Returns false when the like already existed
pub async fn create_like(pool: &PgPool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO post_likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns false when there was nothing to delete
pub async fn delete_like(pool: &PgPool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Users who liked a post, newest account id first
pub async fn list_likers(
    pool: &PgPool,
    post_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.display_name, u.avatar_url, u.bio
        FROM post_likes pl
        JOIN users u ON u.id = pl.user_id
        WHERE pl.post_id = $1
          AND u.deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR u.id < $2)
        ORDER BY u.id DESC
        LIMIT $3
        "#,
    )
    .bind(post_id)
    .bind(cursor)
    .bind(limit)
    .fetch_all(pool)
    .await
}
