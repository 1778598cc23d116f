use crate::config::AppConfig;
use crate::db;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Per-request context handed to every handler: the store handle and config.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;
        Ok(Self { db, config })
    }

    #[cfg(test)]
    pub async fn fake() -> Self {
        Self::fake_with(crate::config::PolicyConfig::default()).await
    }

    #[cfg(test)]
    pub async fn fake_with(policy: crate::config::PolicyConfig) -> Self {
        let db = db::connect_in_memory().await.expect("in-memory pool ok");
        db::migrate(&db).await.expect("migrations ok");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            session: crate::config::SessionConfig {
                secret: "test".into(),
                issuer: "test".into(),
                cookie_name: "session".into(),
                ttl_minutes: 5,
            },
            policy,
        });

        Self { db, config }
    }
}
