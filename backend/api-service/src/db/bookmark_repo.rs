use sqlx::PgPool;

/// Bookmark a post; a repeated bookmark is a no-op
pub async fn create_bookmark(pool: &PgPool, user_id: i64, post_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO bookmarks (user_id, post_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, post_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_bookmark(pool: &PgPool, user_id: i64, post_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(())
}
