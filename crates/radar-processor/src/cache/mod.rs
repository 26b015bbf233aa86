//! Caches shared across requests.

mod volume_index;

pub use volume_index::{CacheStats, VolumeIndexCache};
