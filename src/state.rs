use crate::config::AppConfig;
use crate::users::{memory::MemoryUserStore, PgUserStore, UserStore};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Connects to Postgres and applies pending migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self::with_pool(db, Arc::new(config)))
    }

    pub fn with_pool(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self::from_parts(config, Arc::new(PgUserStore::new(db)))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    /// In-memory state with test JWT settings; no database involved.
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryUserStore::new()),
        )
    }
}
