use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use exec_time_tracker::catalog::{seed::seed_demo_data, Catalog};
use exec_time_tracker::config::{AppConfig, StoreBackend};
use exec_time_tracker::tracking::{MemoryStore, RedisStore, SampleStore};
use exec_time_tracker::{server, AppState};

/// Seed for the demo catalog, so re-runs produce the same data.
const DEMO_SEED: u64 = 42;

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exec_time_tracker=info".into()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // ── 1. Open the sample store ─────────────────────────────────
    let store: Arc<dyn SampleStore> = match &config.store {
        StoreBackend::Memory => {
            info!("using in-memory sample store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis { url, key_prefix } => {
            info!(%url, %key_prefix, "connecting to Redis sample store");
            let store = RedisStore::connect(url, key_prefix)
                .await
                .with_context(|| format!("cannot connect to Redis at {url}"))?;
            Arc::new(store)
        }
    };

    // ── 2. Seed demo catalog ─────────────────────────────────────
    let catalog = Arc::new(Catalog::new());
    if config.seed_students > 0 {
        seed_demo_data(&catalog, config.seed_students, DEMO_SEED);
    }

    // ── 3. Build shared state + router ───────────────────────────
    let (state, writer) = AppState::new(store, catalog, config.stats_stream_interval);
    let state = Arc::new(state);
    let app = server::create_router(state.clone());

    // ── 4. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server listening");
    info!("samples → GET /api/execution-times?pageNumber=1&pageSize=20");
    info!("stats   → GET /api/execution-times/stats");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    // ── 5. Drain deferred samples ────────────────────────────────
    if state.background.flush().await.is_err() {
        warn!("background recorder already stopped; queued samples may be lost");
    }
    drop(state);
    // Open SSE tasks still hold the state until their next tick notices the
    // closed connection.
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        warn!("background recorder did not stop in time");
    }
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
