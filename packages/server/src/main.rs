use std::net::SocketAddr;

use anyhow::Context;
use halisaha_server::billing::gateway_from_config;
use halisaha_server::config::AppConfig;
use halisaha_server::state::AppState;
use halisaha_server::{build_router, database, seed};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    if config.auth.jwt_secret.len() < 32 {
        warn!("auth.jwt_secret is shorter than 32 bytes");
    }

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to the database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to ensure indexes")?;

    let gateway = gateway_from_config(&config.billing);
    info!(provider = ?config.billing.provider, "Payment gateway ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;

    let app = build_router(AppState {
        db,
        config,
        gateway,
    });

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
