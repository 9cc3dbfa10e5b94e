use crate::models::Media;
use sqlx::{PgConnection, PgPool};

pub async fn insert_media(
    conn: &mut PgConnection,
    post_id: i64,
    media_type: &str,
    media_url: &str,
    file_size: i64,
    order_index: i32,
) -> Result<Media, sqlx::Error> {
    sqlx::query_as::<_, Media>(
        r#"
        INSERT INTO media (post_id, media_type, media_url, file_size, order_index)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, post_id, media_type, media_url, file_size, duration, order_index, created_at
        "#,
    )
    .bind(post_id)
    .bind(media_type)
    .bind(media_url)
    .bind(file_size)
    .bind(order_index)
    .fetch_one(conn)
    .await
}

/// Lock the post row and count its media, so concurrent uploads to the same
/// post are serialised until the transaction ends.
pub async fn lock_and_count(conn: &mut PgConnection, post_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM media WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(conn)
        .await
}

/// Media row together with the id of the owning post's author
pub async fn find_with_owner(
    pool: &PgPool,
    media_id: i64,
) -> Result<Option<(Media, i64)>, sqlx::Error> {
    let media = sqlx::query_as::<_, Media>(
        r#"
        SELECT id, post_id, media_type, media_url, file_size, duration, order_index, created_at
        FROM media
        WHERE id = $1
        "#,
    )
    .bind(media_id)
    .fetch_optional(pool)
    .await?;

    let Some(media) = media else {
        return Ok(None);
    };

    let owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM posts WHERE id = $1")
        .bind(media.post_id)
        .fetch_one(pool)
        .await?;

    Ok(Some((media, owner)))
}

pub async fn delete_media(pool: &PgPool, media_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM media WHERE id = $1")
        .bind(media_id)
        .execute(pool)
        .await?;
    Ok(())
}
