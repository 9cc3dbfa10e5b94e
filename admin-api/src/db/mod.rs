use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
}

impl Database {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");

        Ok(Self { pg })
    }

    /// Pool that only connects on first use
    #[cfg(test)]
    pub fn lazy(url: &str) -> anyhow::Result<Self> {
        let pg = PgPoolOptions::new().max_connections(1).connect_lazy(url)?;
        Ok(Self { pg })
    }

    /// The schema is owned by api-service; both services apply the same migrations.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../backend/api-service/migrations")
            .run(&self.pg)
            .await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}
