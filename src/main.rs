use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resource_registry::{config, registry, server, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resource_registry=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("resource-registry v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 1. Load configuration ────────────────────────────────────
    let config = config::load()?;
    let listen = config.listen_addr()?;

    tracing::info!(
        listen = %listen,
        seed_size = config.registry.seed_size,
        metrics_path = %config.metrics.path,
        rules = config.metrics.rules.len(),
        "configuration loaded"
    );

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState::from_config(&config)?);

    // ── 3. Seed the registry before accepting traffic ────────────
    registry::seed(&state.registry, config.registry.seed_size)?;

    // ── 4. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state, &config);

    // ── 5. Bind & serve ──────────────────────────────────────────
    let listener = TcpListener::bind(listen).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
