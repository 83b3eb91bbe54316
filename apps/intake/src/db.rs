use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Creates the PostgreSQL pool without requiring the database to be up.
///
/// Record writes are best-effort, so the service starts (and keeps extracting)
/// while Postgres is unreachable; connections are established on first use.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Configuring PostgreSQL pool...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)
        .context("DATABASE_URL is not a valid PostgreSQL connection string")?;

    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => info!("PostgreSQL connection pool established"),
        Err(e) => warn!("PostgreSQL not reachable at startup ({e}); continuing with lazy pool"),
    }
    Ok(pool)
}
