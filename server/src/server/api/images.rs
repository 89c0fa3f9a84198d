//! Download, preview and gallery handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::services::storage::ImageStore;

use super::{ApiError, err_json};

const PNG_MIME: &str = "image/png";

/// Content type for a stored image; extensionless cache ids are PNG.
pub fn content_type(id: &str) -> &'static str {
    mime_guess::from_path(id).first_raw().unwrap_or(PNG_MIME)
}

fn not_found(store: &ImageStore) -> ApiError {
    match store {
        ImageStore::Disk(_) => err_json(404, "File not found"),
        ImageStore::Memory(_) => err_json(404, "QR code not found or expired"),
    }
}

fn fetch(state: &SharedState, id: &str) -> Result<Vec<u8>, ApiError> {
    let store = state.store();
    match store.load(id) {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => {
            tracing::warn!(id, "Requested image not found");
            Err(not_found(store))
        }
        Err(e) => {
            tracing::error!(id, "Failed to read stored image: {e}");
            Err(err_json(500, &format!("Failed to read image: {e}")))
        }
    }
}

/// Name offered to the browser for a saved image.
pub fn attachment_name(store: &ImageStore, id: &str) -> String {
    match store {
        ImageStore::Disk(_) => format!("shreeram_qrcode_{id}"),
        ImageStore::Memory(_) => format!("shreeram_qr_{id}.png"),
    }
}

/// GET /download/{id}
pub async fn download(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = fetch(&state, &id)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(state.store(), &id)
    );
    tracing::info!(id, size = bytes.len(), "Serving download");

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&id).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /preview/{filename}
pub async fn preview(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = fetch(&state, &filename)?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename)),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        bytes,
    )
        .into_response())
}

/// GET /gallery
pub async fn gallery(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    match state.store() {
        ImageStore::Disk(store) => {
            let files = store.list().map_err(|e| {
                tracing::error!("Failed to list output directory: {e}");
                err_json(500, &format!("Failed to list images: {e}"))
            })?;
            Ok(Json(json!({ "count": files.len(), "files": files })))
        }
        ImageStore::Memory(store) => {
            let entries = store.list();
            Ok(Json(json!({
                "count": entries.len(),
                "qr_codes": entries,
                "capacity": store.capacity(),
            })))
        }
    }
}
