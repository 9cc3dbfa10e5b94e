use sqlx::{Postgres, QueryBuilder};

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ManagedUser, RecentPost, UserDetail, UserStats, UserStatus, UserWithPostCount};
use crate::utils::{filter_value, PageParams};

pub struct UserService {
    db: Database,
}

const USER_COLUMNS: &str = r#"
    u.id, u.email, u.username, u.display_name, u.bio, u.avatar_url, u.header_url,
    u.website, u.birth_date, u.occupation, u.email_verified, u.status, u.role,
    u.last_login_at, u.created_at, u.updated_at
"#;

/// Columns the user list may be ordered by
const SORTABLE_COLUMNS: [&str; 6] = [
    "id",
    "username",
    "email",
    "status",
    "created_at",
    "last_login_at",
];

#[derive(Debug, Default)]
pub struct ListUsersParams {
    pub status: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListUsersParams {
    /// `ORDER BY` clause built only from whitelisted identifiers
    fn order_clause(&self) -> String {
        let column = self
            .sort
            .as_deref()
            .filter(|s| SORTABLE_COLUMNS.contains(s))
            .unwrap_or("created_at");
        let direction = match self.order.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        };
        format!(" ORDER BY u.{column} {direction} NULLS LAST, u.id {direction}")
    }

    fn push_filters(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = filter_value(&self.status) {
            query.push(" AND u.status = ").push_bind(status.to_string());
        }
        if let Some(role) = filter_value(&self.role) {
            query.push(" AND u.role = ").push_bind(role.to_string());
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (u.username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List users with filters, sorting and page pagination
    pub async fn list_users(
        &self,
        params: &ListUsersParams,
        page: PageParams,
    ) -> Result<(Vec<UserWithPostCount>, i64)> {
        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users u WHERE u.deleted_at IS NULL");
        params.push_filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db.pg).await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT {USER_COLUMNS},
                   (SELECT COUNT(*) FROM posts p
                    WHERE p.user_id = u.id AND p.deleted_at IS NULL) AS post_count
            FROM users u
            WHERE u.deleted_at IS NULL
            "#
        ));
        params.push_filters(&mut query);
        query.push(params.order_clause());
        query
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let users = query
            .build_query_as::<UserWithPostCount>()
            .fetch_all(&self.db.pg)
            .await?;

        Ok((users, total))
    }

    pub async fn get_user(&self, user_id: i64) -> Result<ManagedUser> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1 AND u.deleted_at IS NULL");
        sqlx::query_as::<_, ManagedUser>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Profile, activity counters and the five most recent posts
    pub async fn get_user_detail(&self, user_id: i64) -> Result<UserDetail> {
        let user = self.get_user(user_id).await?;

        let (post_count, like_count, follower_count, following_count): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM posts WHERE user_id = $1 AND deleted_at IS NULL),
                    (SELECT COUNT(*) FROM post_likes l
                     JOIN posts p ON p.id = l.post_id
                     WHERE p.user_id = $1 AND p.deleted_at IS NULL),
                    (SELECT COUNT(*) FROM follows WHERE following_id = $1),
                    (SELECT COUNT(*) FROM follows WHERE follower_id = $1)
                "#,
            )
            .bind(user_id)
            .fetch_one(&self.db.pg)
            .await?;

        let recent_posts = sqlx::query_as::<_, RecentPost>(
            r#"
            SELECT p.id, p.content, p.created_at,
                   (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count,
                   (SELECT COUNT(*) FROM comments c
                    WHERE c.post_id = p.id AND c.deleted_at IS NULL) AS comment_count
            FROM posts p
            WHERE p.user_id = $1 AND p.deleted_at IS NULL
            ORDER BY p.created_at DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db.pg)
        .await?;

        Ok(UserDetail {
            user,
            stats: UserStats {
                post_count,
                like_count,
                follower_count,
                following_count,
            },
            recent_posts,
        })
    }

    /// Set a user's status, returning the previous status and the updated row
    pub async fn update_status(
        &self,
        user_id: i64,
        status: UserStatus,
    ) -> Result<(String, ManagedUser)> {
        let mut tx = self.db.pg.begin().await?;

        let old_status: String = sqlx::query_scalar(
            "SELECT status FROM users WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let sql = format!(
            r#"
            UPDATE users u SET status = $2, updated_at = NOW()
            WHERE u.id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, ManagedUser>(&sql)
            .bind(user_id)
            .bind(status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((old_status, user))
    }

    /// Existing users among `user_ids`; unknown ids are skipped
    pub async fn find_existing(&self, user_ids: &[i64]) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM users WHERE id = ANY($1) AND deleted_at IS NULL ORDER BY id",
        )
        .bind(user_ids)
        .fetch_all(&self.db.pg)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_defaults() {
        let params = ListUsersParams::default();
        assert_eq!(
            params.order_clause(),
            " ORDER BY u.created_at DESC NULLS LAST, u.id DESC"
        );
    }

    #[test]
    fn test_order_clause_rejects_unknown_columns() {
        let params = ListUsersParams {
            sort: Some("password_hash; DROP TABLE users".into()),
            order: Some("asc".into()),
            ..Default::default()
        };
        assert_eq!(
            params.order_clause(),
            " ORDER BY u.created_at ASC NULLS LAST, u.id ASC"
        );

        let params = ListUsersParams {
            sort: Some("username".into()),
            order: Some("sideways".into()),
            ..Default::default()
        };
        assert!(params.order_clause().starts_with(" ORDER BY u.username DESC"));
    }

    #[test]
    fn test_filters_bind_values() {
        let params = ListUsersParams {
            status: Some("pending".into()),
            role: Some("all".into()),
            search: Some("ali".into()),
            ..Default::default()
        };
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM users u WHERE 1=1");
        params.push_filters(&mut query);
        assert_eq!(
            query.sql(),
            "SELECT 1 FROM users u WHERE 1=1 AND u.status = $1 \
             AND (u.username ILIKE $2 OR u.email ILIKE $3)"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("plain"), "plain");
    }
}
