//! Filename-keyed cache of volume chunk indexes.
//!
//! Entries are small (a few offsets per record) and never evicted; a volume
//! file never changes once published.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use serde::Serialize;

use crate::index::VolumeMetadata;

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe map from volume filename to [`VolumeMetadata`].
#[derive(Default)]
pub struct VolumeIndexCache {
    entries: RwLock<HashMap<String, Arc<VolumeMetadata>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VolumeIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a filename, counting the hit or miss.
    pub async fn get(&self, filename: &str) -> Option<Arc<VolumeMetadata>> {
        let found = self.entries.read().await.get(filename).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("volume_index_cache_hits_total").increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("volume_index_cache_misses_total").increment(1);
        }
        found
    }

    /// Store an index. When two requests race on the same miss, the first
    /// insert wins and both callers get the same entry back.
    pub async fn insert(&self, filename: &str, metadata: VolumeMetadata) -> Arc<VolumeMetadata> {
        let mut entries = self.entries.write().await;
        entries
            .entry(filename.to_string())
            .or_insert_with(|| Arc::new(metadata))
            .clone()
    }

    pub async fn contains(&self, filename: &str) -> bool {
        self.entries.read().await.contains_key(filename)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }
}
