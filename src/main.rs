use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_observatory::config::AppConfig;
use vitals_observatory::{server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Logging ───────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "vitals_observatory=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 2. Configuration ─────────────────────────────────────────
    let config = AppConfig::from_env().context("loading configuration")?;
    let addr = config.bind_addr;
    info!(
        %addr,
        buffer_capacity = config.buffer_capacity,
        base_url = config.public_base_url.as_deref().unwrap_or("<per request>"),
        "configuration loaded"
    );

    // ── 3. Build shared state & router ───────────────────────────
    let state = Arc::new(AppState::new(config));
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}; is it already in use?"))?;

    info!("Ingest / query → http://{addr}/api/analytics/performance");
    info!("Stats feed     → http://{addr}/api/analytics/performance/stream");
    info!("Link previews  → http://{addr}/api/preview");

    axum::serve(listener, app)
        .await
        .context("server exited with error")?;

    Ok(())
}
