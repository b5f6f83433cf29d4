use crate::config::Config;
use crate::error::{Error, Result};
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            Ok(Backend::Postgres)
        } else {
            Err(Error::Config(format!(
                "Unsupported database URL scheme: {}",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

pub async fn create_pool(config: &Config) -> Result<(AnyPool, Backend)> {
    install_default_drivers();
    let backend = Backend::from_url(&config.database_url)?;

    // Every connection to an in-memory SQLite database gets its own empty
    // database, so the pool must hold exactly one connection forever.
    let options = if backend == Backend::Sqlite && is_in_memory(&config.database_url) {
        AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        AnyPoolOptions::new().max_connections(config.db_max_connections.max(1))
    };

    let pool = options
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    tracing::info!(backend = ?backend, "database pool ready");
    Ok((pool, backend))
}

pub async fn close_pool(pool: &AnyPool) {
    pool.close().await;
    tracing::info!("database pool closed");
}
