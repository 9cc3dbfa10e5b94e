/// Service-specific middleware glue
///
/// The middleware itself lives in the shared `actix-middleware` crate; this
/// module supplies the database-backed account lookup it needs.
use crate::db::user_repo;
use actix_middleware::AccountGate;
use async_trait::async_trait;
use sqlx::PgPool;

/// Account status lookup for `JwtAuthMiddleware::required`
pub struct PgAccountGate {
    pool: PgPool,
}

impl PgAccountGate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountGate for PgAccountGate {
    async fn account_status(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(user_repo::find_status(&self.pool, user_id).await?)
    }
}
