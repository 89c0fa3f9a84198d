pub mod app;
pub mod background;
pub mod config;
pub mod server;
pub mod services;

use image_processor::FontResolver;

use app::SharedState;
use config::AppConfig;
use services::storage::ImageStore;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load config, resolve the caption font and open the image store.
pub fn init_foundation() -> Result<SharedState, anyhow::Error> {
    load_dotenv();

    let config = AppConfig::from_env();
    tracing::info!(
        storage = %config.storage_mode,
        port = config.server_port,
        "Settings loaded"
    );

    let font = FontResolver::new(config.font_size)
        .prepend_paths(config.font_paths.iter().cloned())
        .resolve();
    tracing::info!(font = %font.describe(), "Caption font ready");

    let store = ImageStore::from_config(&config)?;
    Ok(SharedState::new(config, store, font))
}
