//! Bounded in-process image cache.
//!
//! Entries are evicted least-recently-used once `capacity` is reached and are
//! hidden (then swept) once older than `ttl`.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;

use super::{StoredImage, size_kb, timestamped_suffix};

/// A cached image, as shown in the gallery.
#[derive(Debug, Clone, Serialize)]
pub struct CachedEntry {
    pub id: String,
    pub created: String,
    pub size_kb: f64,
}

struct CachedImage {
    png: Vec<u8>,
    created_at: Instant,
}

pub struct MemoryStore {
    entries: Mutex<LruCache<String, CachedImage>>,
    ttl: Duration,
}

impl MemoryStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CachedImage>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, image: &CachedImage, now: Instant) -> bool {
        now.duration_since(image.created_at) >= self.ttl
    }

    pub fn new_id() -> String {
        format!("qr_{}", timestamped_suffix())
    }

    pub fn save(&self, png: Vec<u8>) -> StoredImage {
        let id = Self::new_id();
        let size_bytes = png.len() as u64;
        let image = CachedImage {
            png,
            created_at: Instant::now(),
        };

        let evicted = self.lock().push(id.clone(), image);
        if let Some((old_id, _)) = evicted.filter(|(old_id, _)| *old_id != id) {
            tracing::debug!(evicted = %old_id, "Image cache full, evicted least recently used");
        }

        tracing::info!(id = %id, size_bytes, "Image cached");
        StoredImage { id, size_bytes }
    }

    /// Bytes for `id`, marking it recently used. Expired entries are dropped.
    pub fn load(&self, id: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired = self.is_expired(entries.peek(id)?, now);
        if expired {
            entries.pop(id);
            tracing::debug!(id, "Cached image expired");
            return None;
        }
        entries.get(id).map(|image| image.png.clone())
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, image)| self.is_expired(image, now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            entries.pop(id);
        }
        expired.len()
    }

    /// Live entries, newest first.
    pub fn list(&self) -> Vec<CachedEntry> {
        let now = Instant::now();
        let entries = self.lock();
        let mut live: Vec<(&String, &CachedImage)> = entries
            .iter()
            .filter(|(_, image)| !self.is_expired(image, now))
            .collect();
        live.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then_with(|| b.0.cmp(a.0)));
        live.into_iter()
            .map(|(id, image)| CachedEntry {
                id: id.clone(),
                created: "Recently generated".to_string(),
                size_kb: size_kb(image.png.len() as u64),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
