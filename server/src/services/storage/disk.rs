//! Generated images as files in an output directory.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use super::{StorageError, StoredImage, size_kb, timestamped_suffix};

const LISTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A file in the output directory, as shown in the gallery.
#[derive(Debug, Clone, Serialize)]
pub struct DiskEntry {
    pub filename: String,
    pub created: String,
    pub size_kb: f64,
    #[serde(skip)]
    pub created_at: SystemTime,
}

#[derive(Debug, Clone)]
pub struct DiskStore {
    output_dir: PathBuf,
}

impl DiskStore {
    /// Use `output_dir`, creating it if needed.
    pub fn open(output_dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&output_dir)?;
        tracing::info!(dir = %output_dir.display(), "Output directory ready");
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn new_filename() -> String {
        format!("qr_shreeram_{}.png", timestamped_suffix())
    }

    /// Write `png` under a fresh, unique filename.
    pub fn save(&self, png: &[u8]) -> Result<StoredImage, StorageError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let filename = Self::new_filename();
        let path = self.output_dir.join(&filename);
        std::fs::write(&path, png)?;

        let size_bytes = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => return Err(StorageError::NotSaved(path)),
        };

        tracing::info!(filename = %filename, size_bytes, "Image saved");
        Ok(StoredImage {
            id: filename,
            size_bytes,
        })
    }

    pub fn load(&self, filename: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.output_dir.join(filename);
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "File not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self) -> bool {
        self.output_dir.is_dir()
    }

    /// Image files in the output directory, newest first.
    pub fn list(&self) -> Result<Vec<DiskEntry>, StorageError> {
        let entries = match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
            else {
                continue;
            };
            let listed = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| LISTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if !listed {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }

            let created_at = meta
                .created()
                .or_else(|_| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let local: chrono::DateTime<chrono::Local> = created_at.into();
            files.push(DiskEntry {
                filename,
                created: local.format("%Y-%m-%d %H:%M").to_string(),
                size_kb: size_kb(meta.len()),
                created_at,
            });
        }

        files.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(files)
    }
}
