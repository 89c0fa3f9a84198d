//! Headless server binary.
//!
//! Starts the axum web server and the cache sweeper, then waits for Ctrl+C.

use tracing_subscriber::EnvFilter;

use qr_studio_lib::background;
use qr_studio_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting QR Studio");

    let state = qr_studio_lib::init_foundation()?;

    let server_state = state.clone();
    let failure_token = state.shutdown_token().clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
            failure_token.cancel();
        }
    });

    let s = state.clone();
    tokio::spawn(async move { background::cache_sweep_loop(s).await });

    tracing::info!(
        addr = %state.config().bind_addr(),
        storage = %state.storage_mode(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down...");
            state.shutdown_token().cancel();
        }
        _ = state.shutdown_token().cancelled() => {}
    }

    if let Err(e) = server_handle.await {
        tracing::error!("Server task ended abnormally: {e}");
    }
    Ok(())
}
