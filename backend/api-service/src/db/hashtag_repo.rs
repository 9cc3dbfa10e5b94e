use crate::models::TrendingHashtag;
use sqlx::{PgConnection, PgPool};

/// Link a post to the given hashtag names, creating missing hashtags
pub async fn attach_hashtags(
    conn: &mut PgConnection,
    post_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    for name in names {
        let hashtag_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO hashtags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO post_hashtags (post_id, hashtag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(hashtag_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn detach_all(conn: &mut PgConnection, post_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_hashtags WHERE post_id = $1")
        .bind(post_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Most used hashtags on live posts over the last 7 days
pub async fn trending(pool: &PgPool, limit: i64) -> Result<Vec<TrendingHashtag>, sqlx::Error> {
    sqlx::query_as::<_, TrendingHashtag>(
        r#"
        SELECT h.id, h.name, COUNT(ph.post_id) AS posts_count
        FROM hashtags h
        JOIN post_hashtags ph ON ph.hashtag_id = h.id
        JOIN posts p ON p.id = ph.post_id
        WHERE ph.created_at >= NOW() - INTERVAL '7 days'
          AND p.deleted_at IS NULL
        GROUP BY h.id, h.name
        ORDER BY posts_count DESC, h.name ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
