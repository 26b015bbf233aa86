//! Shared setup for radar-processor integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use radar_common::{RadarError, RadarResult};
use radar_processor::{RadarDataService, RadarProcessorConfig, VolumeIndexCache};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use storage::{Listing, ObjectInfo, ObjectReader, ObjectStorage};
use test_utils::fixtures::{filenames, keys};
use test_utils::Archive2Builder;

pub const FILENAME: &str = filenames::V06;
pub const ARCHIVE_KEY: &str = keys::ARCHIVE_V06;

pub fn memory_storage(bucket: &str) -> Arc<ObjectStorage> {
    Arc::new(ObjectStorage::from_store(Arc::new(InMemory::new()), bucket))
}

/// The standard synthetic volume and its record offsets.
pub fn standard_volume() -> (Vec<u8>, Vec<usize>) {
    Archive2Builder::standard("KOKX").build_with_offsets()
}

/// An archive bucket holding the standard volume under [`ARCHIVE_KEY`].
pub async fn seeded_archive() -> Arc<ObjectStorage> {
    let storage = memory_storage("unidata-nexrad-level2");
    let (data, _) = standard_volume();
    storage.put(ARCHIVE_KEY, Bytes::from(data)).await.unwrap();
    storage
}

/// A chunks bucket holding the standard volume as real-time volume `volume`.
pub async fn seeded_realtime(volume: u32) -> Arc<ObjectStorage> {
    let storage = memory_storage("unidata-nexrad-level2-chunks");
    let chunks = Archive2Builder::standard("KOKX").build_realtime_chunks();
    let last = chunks.len();
    for (i, chunk) in chunks.into_iter().enumerate() {
        let kind = match i + 1 {
            1 => 'S',
            n if n == last => 'E',
            _ => 'I',
        };
        let key = format!("KOKX/{}/20210902-012345-{:03}-{}", volume, i + 1, kind);
        storage.put(&key, Bytes::from(chunk)).await.unwrap();
    }
    storage
}

pub fn service_with(archive: Arc<dyn ObjectReader>, config: RadarProcessorConfig) -> RadarDataService {
    RadarDataService::new(archive, Arc::new(VolumeIndexCache::new()), config)
}

pub fn service(archive: Arc<dyn ObjectReader>) -> RadarDataService {
    service_with(archive, RadarProcessorConfig::default())
}

/// Wraps a reader and sabotages ranged reads starting at chosen offsets.
pub struct FlakyReader {
    inner: Arc<dyn ObjectReader>,
    failing: HashSet<usize>,
    stalling: HashSet<usize>,
}

impl FlakyReader {
    pub fn new(inner: Arc<dyn ObjectReader>) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            stalling: HashSet::new(),
        }
    }

    /// Ranged reads starting at `offset` fail with a transport error.
    pub fn failing_at(mut self, offset: usize) -> Self {
        self.failing.insert(offset);
        self
    }

    /// Ranged reads starting at `offset` never complete in test time.
    pub fn stalling_at(mut self, offset: usize) -> Self {
        self.stalling.insert(offset);
        self
    }
}

#[async_trait]
impl ObjectReader for FlakyReader {
    async fn get(&self, path: &str) -> RadarResult<Bytes> {
        self.inner.get(path).await
    }

    async fn get_range(&self, path: &str, range: Range<usize>) -> RadarResult<Bytes> {
        if self.failing.contains(&range.start) {
            return Err(RadarError::transport(format!(
                "connection reset reading {} at {}",
                path, range.start
            )));
        }
        if self.stalling.contains(&range.start) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.inner.get_range(path, range).await
    }

    async fn head(&self, path: &str) -> RadarResult<ObjectInfo> {
        self.inner.head(path).await
    }

    async fn list(&self, prefix: &str) -> RadarResult<Vec<ObjectInfo>> {
        self.inner.list(prefix).await
    }

    async fn list_with_delimiter(&self, prefix: &str) -> RadarResult<Listing> {
        self.inner.list_with_delimiter(prefix).await
    }
}
