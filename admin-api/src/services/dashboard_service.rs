// Dashboard service - provides statistics and chart data
use serde::Serialize;

use crate::db::Database;
use crate::error::Result;

pub struct DashboardService {
    db: Database,
}

pub const PENDING_USERS_ALERT_THRESHOLD: i64 = 10;
pub const PENDING_RESETS_ALERT_THRESHOLD: i64 = 5;
pub const CHART_DAYS: i32 = 30;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub users: UserCounts,
    pub posts: PostCounts,
    pub active_users_7d: i64,
    pub password_reset_pending: i64,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

#[derive(Debug, Serialize)]
pub struct PostCounts {
    pub total: i64,
    pub today: i64,
    /// Percentage of posts with at least one media attachment
    pub with_media_rate: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, Copy)]
pub enum ChartSeries {
    Posts,
    Users,
}

impl ChartSeries {
    fn table(&self) -> &'static str {
        match self {
            ChartSeries::Posts => "posts",
            ChartSeries::Users => "users",
        }
    }
}

impl DashboardService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get dashboard statistics
    pub async fn get_stats(&self) -> Result<DashboardStats> {
        let users = sqlx::query_as::<_, UserCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM users
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.db.pg)
        .await?;

        let (total_posts, today_posts, posts_with_media, active_users_7d): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE created_at >= CURRENT_DATE),
                    COUNT(*) FILTER (WHERE EXISTS (SELECT 1 FROM media m WHERE m.post_id = posts.id)),
                    COUNT(DISTINCT user_id) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days')
                FROM posts
                WHERE deleted_at IS NULL
                "#,
            )
            .fetch_one(&self.db.pg)
            .await?;

        let password_reset_pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM password_reset_requests WHERE status = 'pending'",
        )
        .fetch_one(&self.db.pg)
        .await?;

        let alerts = build_alerts(users.pending, password_reset_pending);

        Ok(DashboardStats {
            users,
            posts: PostCounts {
                total: total_posts,
                today: today_posts,
                with_media_rate: with_media_rate(total_posts, posts_with_media),
            },
            active_users_7d,
            password_reset_pending,
            alerts,
        })
    }

    /// Daily counts for the last 30 days, oldest first, including empty days
    pub async fn chart(&self, series: ChartSeries) -> Result<ChartData> {
        let sql = format!(
            r#"
            SELECT to_char(d.day, 'YYYY-MM-DD') AS label, COUNT(t.id) AS value
            FROM generate_series(
                CURRENT_DATE - ($1::int - 1) * INTERVAL '1 day',
                CURRENT_DATE,
                INTERVAL '1 day'
            ) AS d(day)
            LEFT JOIN {table} t
                ON t.created_at >= d.day
               AND t.created_at < d.day + INTERVAL '1 day'
               AND t.deleted_at IS NULL
            GROUP BY d.day
            ORDER BY d.day
            "#,
            table = series.table()
        );

        let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
            .bind(CHART_DAYS)
            .fetch_all(&self.db.pg)
            .await?;

        Ok(ChartData::from_rows(rows))
    }
}

impl ChartData {
    fn from_rows(rows: Vec<(String, i64)>) -> Self {
        let (labels, values) = rows.into_iter().unzip();
        Self { labels, values }
    }
}

fn with_media_rate(total: i64, with_media: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    with_media as f64 / total as f64 * 100.0
}

fn build_alerts(pending_users: i64, pending_resets: i64) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if pending_users >= PENDING_USERS_ALERT_THRESHOLD {
        alerts.push(Alert {
            kind: "pending_users",
            message: format!(
                "{PENDING_USERS_ALERT_THRESHOLD} or more users are waiting for approval"
            ),
            count: pending_users,
        });
    }
    if pending_resets >= PENDING_RESETS_ALERT_THRESHOLD {
        alerts.push(Alert {
            kind: "password_reset",
            message: format!(
                "{PENDING_RESETS_ALERT_THRESHOLD} or more password reset requests are pending"
            ),
            count: pending_resets,
        });
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_media_rate() {
        assert_eq!(with_media_rate(0, 0), 0.0);
        assert_eq!(with_media_rate(4, 1), 25.0);
        assert_eq!(with_media_rate(10, 10), 100.0);
    }

    #[test]
    fn test_alert_thresholds() {
        assert!(build_alerts(9, 4).is_empty());

        let alerts = build_alerts(10, 4);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "pending_users");
        assert_eq!(alerts[0].count, 10);

        let alerts = build_alerts(0, 5);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "password_reset");

        assert_eq!(build_alerts(12, 7).len(), 2);
    }

    #[test]
    fn test_alert_serializes_type_field() {
        let json = serde_json::to_value(&build_alerts(10, 0)[0]).unwrap();
        assert_eq!(json["type"], "pending_users");
        assert_eq!(json["count"], 10);
    }

    #[test]
    fn test_chart_rows_split_into_series() {
        let chart = ChartData::from_rows(vec![
            ("2024-01-01".to_string(), 3),
            ("2024-01-02".to_string(), 0),
        ]);
        assert_eq!(chart.labels, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(chart.values, vec![3, 0]);
    }
}
