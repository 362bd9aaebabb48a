use anyhow::Context;
use clap::Parser;
use log::info;
use risklens::{server, ArtifactStore, ServerConfig};
use std::sync::Arc;
use std::time::Instant;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    risklens::init_logger();
    let config = ServerConfig::parse();

    let start_time = Instant::now();
    info!("Loading artifacts from {:?}...", config.model_dir);

    // Any artifact problem is fatal: never bind the port with a half-loaded store.
    let store = ArtifactStore::builder()
        .with_runtime_config(config.runtime_config())
        .with_model_dir(&config.model_dir)
        .and_then(|builder| builder.build())
        .with_context(|| format!("failed to load model artifacts from {:?}", config.model_dir))?;

    let info = store.info();
    info!(
        "Artifacts ready in {:.2?}: {} columns, encoders for {:?}",
        start_time.elapsed(),
        info.num_columns,
        info.encoded_columns
    );

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, server::router(Arc::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
