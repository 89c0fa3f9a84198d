//! Generated image storage: output directory or bounded in-memory cache.

pub mod disk;
pub mod memory;

pub use disk::{DiskEntry, DiskStore};
pub use memory::{CachedEntry, MemoryStore};

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::config::{AppConfig, StorageMode};

static RE_SAFE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File was not saved properly: {0}")]
    NotSaved(PathBuf),
}

/// Result of storing one generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Filename (disk) or cache identifier (memory).
    pub id: String,
    pub size_bytes: u64,
}

pub enum ImageStore {
    Disk(DiskStore),
    Memory(MemoryStore),
}

impl ImageStore {
    /// Build the store selected by `config.storage_mode`.
    pub fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        match config.storage_mode {
            StorageMode::Disk => Ok(Self::Disk(DiskStore::open(config.output_dir.clone())?)),
            StorageMode::Memory => Ok(Self::Memory(MemoryStore::new(
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_secs),
            ))),
        }
    }

    pub fn mode(&self) -> StorageMode {
        match self {
            Self::Disk(_) => StorageMode::Disk,
            Self::Memory(_) => StorageMode::Memory,
        }
    }

    pub fn save(&self, png: Vec<u8>) -> Result<StoredImage, StorageError> {
        match self {
            Self::Disk(store) => store.save(&png),
            Self::Memory(store) => Ok(store.save(png)),
        }
    }

    /// Fetch stored bytes; `Ok(None)` for unknown, expired or unsafe names.
    pub fn load(&self, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if !is_safe_name(id) {
            tracing::warn!(id, "Rejected unsafe image name");
            return Ok(None);
        }
        match self {
            Self::Disk(store) => store.load(id),
            Self::Memory(store) => Ok(store.load(id)),
        }
    }
}

/// Whether `name` is a plain file name with no path components.
pub fn is_safe_name(name: &str) -> bool {
    RE_SAFE_NAME.is_match(name) && !name.contains("..")
}

/// `<YYYYMMDD_HHMMSS>_<8 hex chars>` in local time.
pub(crate) fn timestamped_suffix() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("{timestamp}_{}", &unique[..8])
}

/// Size in kilobytes, rounded to one decimal.
pub fn size_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_names() {
        assert!(is_safe_name("qr_shreeram_20240101_120000_abcdef12.png"));
        assert!(is_safe_name("qr_20240101_120000_abcdef12"));
        assert!(!is_safe_name("../etc/passwd"));
        assert!(!is_safe_name("a/b.png"));
        assert!(!is_safe_name("a\\b.png"));
        assert!(!is_safe_name(".hidden"));
        assert!(!is_safe_name("x..png"));
        assert!(!is_safe_name(""));
    }

    #[test]
    fn suffix_has_timestamp_and_hex() {
        let suffix = timestamped_suffix();
        let (stamp, hex) = suffix.rsplit_once('_').unwrap();
        assert_eq!(stamp.len(), "20240101_120000".len());
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn size_kb_rounds_to_one_decimal() {
        assert_eq!(size_kb(1024), 1.0);
        assert_eq!(size_kb(1536), 1.5);
        assert_eq!(size_kb(100), 0.1);
    }
}
