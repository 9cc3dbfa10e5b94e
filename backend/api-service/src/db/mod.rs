/// Database access layer
///
/// Repositories are free functions over a `PgPool` (or a `PgConnection`
/// when the caller runs them inside a transaction). They return raw
/// `sqlx::Error`; mapping to HTTP errors happens in the service layer.
pub mod bookmark_repo;
pub mod comment_repo;
pub mod follow_repo;
pub mod hashtag_repo;
pub mod like_repo;
pub mod media_repo;
pub mod post_repo;
pub mod token_repo;
pub mod user_repo;

/// True when the error is a Postgres unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
