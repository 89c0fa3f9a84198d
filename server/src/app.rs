use std::sync::Arc;

use chrono::{DateTime, Local};
use image_processor::CaptionFont;
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, StorageMode};
use crate::services::storage::ImageStore;

/// Application shared state accessible from axum handlers and background tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    /// Where generated images live
    store: ImageStore,
    /// Caption font, resolved once at startup
    font: Arc<CaptionFont>,
    shutdown_token: CancellationToken,
    started_at: DateTime<Local>,
}

impl SharedState {
    pub fn new(config: AppConfig, store: ImageStore, font: CaptionFont) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                config,
                store,
                font: Arc::new(font),
                shutdown_token: CancellationToken::new(),
                started_at: Local::now(),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &ImageStore {
        &self.inner.store
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.inner.store.mode()
    }

    pub fn font(&self) -> Arc<CaptionFont> {
        self.inner.font.clone()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.inner.started_at
    }
}
