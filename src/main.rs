use clap::Parser;
use quizsmith::{
    cli::{dispatch, Cli},
    config::{get_config, init_config},
    database::{pool::create_pool, SqliteStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizsmith=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_config()?;
    let cli = Cli::parse();
    let config = get_config();

    let pool = create_pool().await?;
    tracing::debug!(database_url = %config.database_url, "Opened local store");

    let state = AppState::new(Arc::new(SqliteStore::new(pool)))?;
    dispatch(&state, cli).await?;

    Ok(())
}
