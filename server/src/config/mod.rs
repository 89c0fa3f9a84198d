//! Configuration management: defaults, validation, loading from the environment.

pub mod app_config;
pub mod validation;

pub use app_config::AppConfig;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where generated images are kept between `/generate` and `/download`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// PNG files in the output directory.
    Disk,
    /// Bounded in-process cache; responses carry a data URL.
    Memory,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Memory => "memory",
        }
    }

    /// Caption used when a request leaves the headline empty.
    pub fn default_caption(&self) -> &'static str {
        match self {
            Self::Disk => "",
            Self::Memory => "QR Code by Shreeram",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" => Ok(Self::Disk),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage mode '{other}'")),
        }
    }
}
