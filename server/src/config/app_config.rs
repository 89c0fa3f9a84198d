//! Runtime application configuration loaded from the environment.

use std::path::PathBuf;

use super::StorageMode;
use super::validation::validate_setting;

pub const DEFAULT_SERVER_PORT: u16 = 5000;
pub const DEFAULT_FONT_SIZE: f32 = 30.0;
pub const DEFAULT_CACHE_CAPACITY: usize = 128;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_CACHE_SWEEP_SECS: u64 = 60;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub storage_mode: StorageMode,
    pub data_dir: PathBuf,
    /// Directory for generated images (disk mode).
    pub output_dir: PathBuf,
    /// Caption used when the form's headline is empty.
    pub default_caption: String,
    /// Font files searched before the platform's well-known fonts.
    pub font_paths: Vec<PathBuf>,
    pub font_size: f32,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub cache_sweep_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            server_host: "0.0.0.0".into(),
            server_port: DEFAULT_SERVER_PORT,
            storage_mode: StorageMode::Disk,
            output_dir: data_dir.join("generated"),
            data_dir,
            default_caption: StorageMode::Disk.default_caption().into(),
            font_paths: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_sweep_secs: DEFAULT_CACHE_SWEEP_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Invalid values are logged and
    /// replaced by their defaults.
    pub fn load_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?;
            let value = value.trim().to_string();
            if value.is_empty() {
                return None;
            }
            match validate_setting(key, &value) {
                Ok(()) => Some(value),
                Err(e) => {
                    tracing::warn!(key, value = %value, "Ignoring invalid setting: {e}");
                    None
                }
            }
        };

        let defaults = Self::default();

        let storage_mode = g("STORAGE_MODE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.storage_mode);

        let data_dir = g("QR_STUDIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let output_dir = g("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("generated"));

        // An explicitly empty DEFAULT_CAPTION is honoured, so read it raw.
        let default_caption = match lookup("DEFAULT_CAPTION") {
            Some(v) if validate_setting("DEFAULT_CAPTION", &v).is_ok() => v.trim().to_string(),
            _ => storage_mode.default_caption().to_string(),
        };

        let font_paths = lookup("FONT_PATHS")
            .map(|v| std::env::split_paths(&v).filter(|p| !p.as_os_str().is_empty()).collect())
            .unwrap_or_default();

        Self {
            server_host: g("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(g("SERVER_PORT"), defaults.server_port),
            storage_mode,
            data_dir,
            output_dir,
            default_caption,
            font_paths,
            font_size: parse_or(g("FONT_SIZE"), defaults.font_size),
            cache_capacity: parse_or(g("CACHE_CAPACITY"), defaults.cache_capacity),
            cache_ttl_secs: parse_or(g("CACHE_TTL_SECS"), defaults.cache_ttl_secs),
            cache_sweep_secs: parse_or(g("CACHE_SWEEP_SECS"), defaults.cache_sweep_secs),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Default data directory: `~/.qr-studio`.
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".qr-studio")
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_with(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = load(&[]);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.storage_mode, StorageMode::Disk);
        assert_eq!(config.default_caption, "");
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(config.font_paths.is_empty());
    }

    #[test]
    fn memory_mode_has_placeholder_caption() {
        let config = load(&[("STORAGE_MODE", "memory")]);
        assert_eq!(config.storage_mode, StorageMode::Memory);
        assert_eq!(config.default_caption, "QR Code by Shreeram");
    }

    #[test]
    fn storage_mode_env_value_is_case_insensitive() {
        let config = load(&[("STORAGE_MODE", "Memory")]);
        assert_eq!(config.storage_mode, StorageMode::Memory);
    }

    #[test]
    fn explicit_caption_overrides_mode_default() {
        let config = load(&[("STORAGE_MODE", "memory"), ("DEFAULT_CAPTION", "")]);
        assert_eq!(config.default_caption, "");
        let config = load(&[("DEFAULT_CAPTION", "Scan me")]);
        assert_eq!(config.default_caption, "Scan me");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = load(&[
            ("SERVER_PORT", "not-a-port"),
            ("STORAGE_MODE", "s3"),
            ("CACHE_CAPACITY", "0"),
        ]);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.storage_mode, StorageMode::Disk);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn output_dir_defaults_under_data_dir() {
        let config = load(&[("QR_STUDIO_DATA_DIR", "/tmp/qr-data")]);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/qr-data/generated"));
        let config = load(&[("OUTPUT_DIR", "/srv/qr")]);
        assert_eq!(config.output_dir, PathBuf::from("/srv/qr"));
    }

    #[test]
    fn font_paths_are_split() {
        let joined = std::env::join_paths(["/a/one.ttf", "/b/two.otf"]).unwrap();
        let config = load(&[("FONT_PATHS", joined.to_str().unwrap())]);
        assert_eq!(
            config.font_paths,
            vec![PathBuf::from("/a/one.ttf"), PathBuf::from("/b/two.otf")]
        );
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = load(&[("SERVER_HOST", "127.0.0.1"), ("SERVER_PORT", "8081")]);
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
    }
}
