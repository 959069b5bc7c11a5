use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;

use consumption_service::api::{self, AppState};
use consumption_service::config::AppConfig;
use consumption_service::eloverblik::token::TokenManager;
use consumption_service::eloverblik::EloverblikClient;
use consumption_service::{metrics_server, observability};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.url)
        .await?;
    consumption_store::db::init_schema(&pool).await?;

    let client = Arc::new(EloverblikClient::new(&cfg.eloverblik)?);
    let tokens = TokenManager::new(pool.clone(), client.clone());
    let sample = cfg.eloverblik.sample_credentials();

    let state = AppState {
        pool,
        client,
        tokens,
        sample,
    };
    let app = api::router(state);

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "consumption service listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
