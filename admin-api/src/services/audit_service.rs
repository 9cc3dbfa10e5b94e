use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::db::Database;
use crate::error::Result;
use crate::models::{AdminLog, CreateAdminLog};
use crate::utils::{filter_value, PageParams};

pub struct AuditService {
    db: Database,
}

#[derive(Debug, Default)]
pub struct LogFilters {
    pub action: Option<String>,
    pub admin_username: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive of the whole day
    pub end_date: Option<String>,
}

impl AuditService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist an admin action and emit it as a structured event
    pub async fn log(&self, entry: CreateAdminLog<'_>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_logs (admin_id, action, target_user_id, details, ip)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.admin_id)
        .bind(entry.action.as_str())
        .bind(entry.target_user_id)
        .bind(&entry.details)
        .bind(&entry.ip)
        .execute(&self.db.pg)
        .await?;

        tracing::info!(
            action = entry.action.as_str(),
            admin_id = entry.admin_id,
            admin_username = entry.admin_username,
            target_user_id = ?entry.target_user_id,
            target_username = ?entry.target_username,
            details = %entry.details,
            ip = %entry.ip,
            "Admin action performed"
        );

        Ok(())
    }

    pub async fn list(&self, filters: &LogFilters, page: PageParams) -> Result<(Vec<AdminLog>, i64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM admin_logs l JOIN users a ON a.id = l.admin_id WHERE 1=1",
        );
        push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db.pg).await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT l.id, l.admin_id, a.username AS admin_username, l.action,
                   l.target_user_id, t.username AS target_username,
                   l.details, l.ip, l.created_at
            FROM admin_logs l
            JOIN users a ON a.id = l.admin_id
            LEFT JOIN users t ON t.id = l.target_user_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY l.created_at DESC, l.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let logs = query
            .build_query_as::<AdminLog>()
            .fetch_all(&self.db.pg)
            .await?;

        Ok((logs, total))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &LogFilters) {
    if let Some(action) = filter_value(&filters.action) {
        query.push(" AND l.action = ").push_bind(action.to_string());
    }
    if let Some(username) = filter_value(&filters.admin_username) {
        query.push(" AND a.username = ").push_bind(username.to_string());
    }
    if let Some(start) = filters.start_date.as_deref().and_then(parse_day) {
        query
            .push(" AND l.created_at >= ")
            .push_bind(Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)));
    }
    if let Some(end) = filters.end_date.as_deref().and_then(parse_day) {
        let next_day = Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)) + Duration::days(1);
        query.push(" AND l.created_at < ").push_bind(next_day);
    }
}

/// Invalid dates are ignored rather than rejected
fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_day(" 2024-12-31 "), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(parse_day("03/01/2024"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_filters_build_expected_sql() {
        let filters = LogFilters {
            action: Some("approve_user".into()),
            admin_username: Some("root".into()),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
        };
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 WHERE 1=1");
        push_filters(&mut query, &filters);
        assert_eq!(
            query.sql(),
            "SELECT 1 WHERE 1=1 AND l.action = $1 AND a.username = $2 \
             AND l.created_at >= $3 AND l.created_at < $4"
        );
    }

    #[test]
    fn test_all_and_bad_dates_are_skipped() {
        let filters = LogFilters {
            action: Some("all".into()),
            admin_username: None,
            start_date: Some("yesterday".into()),
            end_date: None,
        };
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 WHERE 1=1");
        push_filters(&mut query, &filters);
        assert_eq!(query.sql(), "SELECT 1 WHERE 1=1");
    }
}
