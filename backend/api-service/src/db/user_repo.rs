use crate::models::{user::ProfileUpdate, User};
use sqlx::PgPool;

const USER_COLUMNS: &str = r#"
    id, email, password_hash, username, display_name, bio, avatar_url, header_url,
    website, birth_date, occupation, email_verified, status, role, created_at, updated_at
"#;

/// Insert a new account
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
    status: &str,
) -> Result<User, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO users (email, username, password_hash, status)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(status)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    let sql =
        format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Resolve a username to an id
pub async fn find_id_by_username(pool: &PgPool, username: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM users WHERE username = $1 AND deleted_at IS NULL",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

/// Account status for the auth gate; `None` when the user does not exist
pub async fn find_status(pool: &PgPool, id: i64) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT status FROM users WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Apply a partial profile update. Fields left as `None` keep their value.
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    update: &ProfileUpdate,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE users SET
            display_name = COALESCE($2, display_name),
            bio          = COALESCE($3, bio),
            avatar_url   = COALESCE($4, avatar_url),
            header_url   = COALESCE($5, header_url),
            website      = COALESCE($6, website),
            birth_date   = COALESCE($7, birth_date),
            occupation   = COALESCE($8, occupation),
            updated_at   = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {USER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(update.display_name.as_deref())
        .bind(update.bio.as_deref())
        .bind(update.avatar_url.as_deref())
        .bind(update.header_url.as_deref())
        .bind(update.website.as_deref())
        .bind(update.birth_date)
        .bind(update.occupation.as_deref())
        .fetch_optional(pool)
        .await
}

pub async fn update_password(
    conn: &mut sqlx::PgConnection,
    id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_email_verified(
    conn: &mut sqlx::PgConnection,
    id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
