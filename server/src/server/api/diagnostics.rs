//! Liveness / diagnostic endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::services::storage::ImageStore;

/// GET /test
pub async fn self_test(State(state): State<SharedState>) -> Json<Value> {
    tracing::debug!("Test endpoint accessed");

    let font = state.font();
    let mut body = json!({
        "status": "working",
        "message": "QR Studio is running",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "started_at": state.started_at().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage_mode(),
        "font": font.describe(),
        "builtin_font": font.is_builtin(),
    });

    match state.store() {
        ImageStore::Disk(store) => {
            body["output_dir"] = json!(store.output_dir().display().to_string());
            body["output_dir_exists"] = json!(store.exists());
        }
        ImageStore::Memory(store) => {
            body["cached"] = json!(store.len());
            body["capacity"] = json!(store.capacity());
            body["ttl_secs"] = json!(store.ttl().as_secs());
        }
    }

    Json(body)
}
