use crate::config::get_config;
use crate::error::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub async fn create_pool() -> Result<SqlitePool> {
    let config = get_config();
    create_pool_for(&config.database_url).await
}

/// Opens the store at `database_url` and applies pending migrations.
/// In-memory databases are pinned to a single, never-recycled connection so
/// their contents live as long as the pool.
pub async fn create_pool_for(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = options
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::debug!(in_memory, "Local store ready");
    Ok(pool)
}
