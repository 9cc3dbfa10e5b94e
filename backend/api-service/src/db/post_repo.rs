use crate::models::{Media, PostRow};
use sqlx::{PgConnection, PgPool};

/// Post columns joined with author and counters. `$1` is the viewer id
/// (NULL for anonymous viewers).
const POST_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.content, p.created_at, p.updated_at,
           u.username, u.display_name, u.avatar_url, u.bio,
           (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS likes_count,
           (SELECT COUNT(*) FROM comments c
             WHERE c.post_id = p.id AND c.deleted_at IS NULL) AS comments_count,
           EXISTS(SELECT 1 FROM post_likes pl
                   WHERE pl.post_id = p.id AND pl.user_id = $1) AS is_liked,
           EXISTS(SELECT 1 FROM bookmarks b
                   WHERE b.post_id = p.id AND b.user_id = $1) AS is_bookmarked
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

pub async fn insert_post(
    conn: &mut PgConnection,
    user_id: i64,
    content: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO posts (user_id, content) VALUES ($1, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(content)
    .fetch_one(conn)
    .await
}

pub async fn update_content(
    conn: &mut PgConnection,
    post_id: i64,
    content: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET content = $2, updated_at = NOW() WHERE id = $1")
        .bind(post_id)
        .bind(content)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn soft_delete(pool: &PgPool, post_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Owner of a live post
pub async fn find_owner(pool: &PgPool, post_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT user_id FROM posts WHERE id = $1 AND deleted_at IS NULL")
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_post(
    pool: &PgPool,
    post_id: i64,
    viewer: Option<i64>,
) -> Result<Option<PostRow>, sqlx::Error> {
    let sql = format!("{POST_SELECT} WHERE p.id = $2 AND p.deleted_at IS NULL");
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(viewer)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Global or following timeline. The following timeline includes the
/// viewer's own posts.
pub async fn timeline(
    pool: &PgPool,
    viewer: Option<i64>,
    following_only: bool,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let sql = format!(
        r#"{POST_SELECT}
        WHERE p.deleted_at IS NULL
          AND u.deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR p.id < $2)
          AND (NOT $3 OR p.user_id = $1
               OR p.user_id IN (SELECT following_id FROM follows WHERE follower_id = $1))
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $4
        "#
    );
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(viewer)
        .bind(cursor)
        .bind(following_only)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn user_posts(
    pool: &PgPool,
    author_id: i64,
    viewer: Option<i64>,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let sql = format!(
        r#"{POST_SELECT}
        WHERE p.user_id = $2
          AND p.deleted_at IS NULL
          AND ($3::BIGINT IS NULL OR p.id < $3)
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $4
        "#
    );
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(viewer)
        .bind(author_id)
        .bind(cursor)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn bookmarked_posts(
    pool: &PgPool,
    user_id: i64,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let sql = format!(
        r#"{POST_SELECT}
        JOIN bookmarks bm ON bm.post_id = p.id AND bm.user_id = $1
        WHERE p.deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR p.id < $2)
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $3
        "#
    );
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(Some(user_id))
        .bind(cursor)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn hashtag_posts(
    pool: &PgPool,
    hashtag: &str,
    viewer: Option<i64>,
    cursor: Option<i64>,
    limit: i64,
) -> Result<Vec<PostRow>, sqlx::Error> {
    let sql = format!(
        r#"{POST_SELECT}
        JOIN post_hashtags ph ON ph.post_id = p.id
        JOIN hashtags h ON h.id = ph.hashtag_id
        WHERE h.name = $2
          AND p.deleted_at IS NULL
          AND ($3::BIGINT IS NULL OR p.id < $3)
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $4
        "#
    );
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(viewer)
        .bind(hashtag)
        .bind(cursor)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Media of several posts, ordered by post then `order_index`
pub async fn media_for_posts(pool: &PgPool, post_ids: &[i64]) -> Result<Vec<Media>, sqlx::Error> {
    sqlx::query_as::<_, Media>(
        r#"
        SELECT id, post_id, media_type, media_url, file_size, duration, order_index, created_at
        FROM media
        WHERE post_id = ANY($1)
        ORDER BY post_id, order_index
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await
}

/// (post_id, hashtag name) pairs for several posts
pub async fn hashtags_for_posts(
    pool: &PgPool,
    post_ids: &[i64],
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT ph.post_id, h.name
        FROM post_hashtags ph
        JOIN hashtags h ON h.id = ph.hashtag_id
        WHERE ph.post_id = ANY($1)
        ORDER BY ph.post_id, h.name
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await
}
