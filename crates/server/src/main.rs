//! momentum-mcp server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use momentum_client::{CacheController, FetchConfig, Fetcher, HttpFetcher, Registration};
use momentum_core::features::FocusTimer;
use momentum_core::{AppConfig, CacheDb, LocalStore, SqliteStorage};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use url::Url;

mod handler;
mod tools;

use handler::{AppContext, MomentumServer};

/// Advance the focus timer once a second for as long as the server runs.
fn spawn_timer(ctx: Arc<AppContext>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            match FocusTimer::new(&ctx.store).tick() {
                Ok((_, Some(mode))) => tracing::info!(mode = %mode, "Time for {}!", mode),
                Ok(_) => {}
                Err(e) => tracing::warn!("timer tick failed: {}", e),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db = %config.db_path.display(), scope = %config.scope, version = %config.cache_version, "Starting momentum server on stdio transport");

    let scope = Url::parse(&config.scope)?;
    let db = CacheDb::open(&config.db_path).await?;
    let store = LocalStore::new(SqliteStorage::open(&config.db_path)?);
    let network: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
    let registration = Arc::new(Registration::new(db.clone(), network.clone()));
    let client = registration.open_client().await;

    if config.offline_enabled {
        let controller = CacheController::from_config(&config, db.clone(), network.clone())?;
        registration.register_or_continue(controller).await;
    } else {
        tracing::info!("offline cache disabled; fetching from the network only");
    }

    let ctx = Arc::new(AppContext { config, scope, store, db, network, registration, client });
    spawn_timer(ctx.clone());

    let handler = MomentumServer::new(ctx);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
