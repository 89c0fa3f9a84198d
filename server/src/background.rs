//! Background task loops: memory cache expiry sweep.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::app::SharedState;
use crate::services::storage::ImageStore;

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Periodically drop expired entries from the in-memory image cache.
///
/// Returns immediately in disk mode.
pub async fn cache_sweep_loop(state: SharedState) {
    let ImageStore::Memory(store) = state.store() else {
        return;
    };
    let shutdown_token = state.shutdown_token().clone();
    let interval = Duration::from_secs(state.config().cache_sweep_secs.max(1));

    loop {
        if sleep_or_cancel(&shutdown_token, interval).await {
            tracing::info!("Cache sweep loop stopped (shutdown)");
            return;
        }

        let removed = store.sweep_expired();
        if removed > 0 {
            tracing::info!(removed, remaining = store.len(), "Expired cached images removed");
        }
    }
}
