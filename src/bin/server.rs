use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use trivia_api::config::Settings;
use trivia_api::db::{self, SqliteStore};
use trivia_api::server::run_server;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on, overrides TRIVIA_BIND
    #[clap(long)]
    bind: Option<SocketAddr>,
    /// Database URL, overrides TRIVIA_DATABASE_URL
    #[clap(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let database_url = cli.database_url.unwrap_or(settings.database_url);
    let bind = cli.bind.unwrap_or(settings.bind);

    let pool = db::establish_connection(&database_url)
        .await
        .with_context(|| format!("Cannot connect to {database_url}"))?;
    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    run_server(Arc::new(SqliteStore::new(pool)), bind).await
}
