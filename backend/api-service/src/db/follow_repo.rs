use crate::models::UserSummary;
use sqlx::PgPool;

pub async fn create_follow(
    pool: &PgPool,
    follower_id: i64,
    following_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns false when no follow existed
pub async fn delete_follow(
    pool: &PgPool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_following(
    pool: &PgPool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await
}

/// (followers, following) for a user
pub async fn count_follows(pool: &PgPool, user_id: i64) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM follows f JOIN users u ON u.id = f.follower_id
              WHERE f.following_id = $1 AND u.deleted_at IS NULL),
            (SELECT COUNT(*) FROM follows f JOIN users u ON u.id = f.following_id
              WHERE f.follower_id = $1 AND u.deleted_at IS NULL)
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Users following `user_id`, newest account id first. Fetches `limit` rows.
pub async fn list_followers(
    pool: &PgPool,
    user_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.display_name, u.avatar_url, u.bio
        FROM follows f
        JOIN users u ON u.id = f.follower_id
        WHERE f.following_id = $1
          AND u.deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR u.id < $2)
        ORDER BY u.id DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(cursor)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Users `user_id` follows, newest account id first
pub async fn list_following(
    pool: &PgPool,
    user_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.display_name, u.avatar_url, u.bio
        FROM follows f
        JOIN users u ON u.id = f.following_id
        WHERE f.follower_id = $1
          AND u.deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR u.id < $2)
        ORDER BY u.id DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(cursor)
    .bind(limit)
    .fetch_all(pool)
    .await
}
