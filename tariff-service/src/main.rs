use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tariff_service::{
    api::{self, AppState},
    config::AppConfig,
    metrics_server, observability,
    source::QuestDbUsageSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // QuestDB is read over pgwire; the tables are written by the ingestion side.
    let pool = PgPoolOptions::new()
        .max_connections(cfg.questdb.max_connections)
        .connect(&cfg.questdb.uri)
        .await?;

    let state = AppState::new(Arc::new(QuestDbUsageSource::new(pool)));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", cfg.server.bind_addr))?;
    tracing::info!(addr = %cfg.server.bind_addr, "tariff service listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
