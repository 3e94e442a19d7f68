mod api;
mod bootstrap;
mod health;

use std::time::Duration;

use anyhow::Result;
use sitequote_core::config::{AppConfig, LoadOptions};

/// `RUST_LOG` wins over `logging.level` when set.
fn init_logging(config: &AppConfig) {
    use sitequote_core::config::LogFormat::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let router = health::router(app.db_pool.clone(), app.api_state.catalog.clone())
        .merge(api::router(app.api_state.clone()));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "sitequote-server listening"
    );

    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = app.config.server.graceful_shutdown_secs,
        "sitequote-server stopping"
    );
    let _ = shutdown_tx.send(());

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            "in-flight requests did not finish within the grace period"
        ),
    }

    app.db_pool.close().await;
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
