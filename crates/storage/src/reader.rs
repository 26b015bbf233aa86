//! Read-only object access used by the radar processor.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use radar_common::RadarResult;
use serde::Serialize;
use std::ops::Range;

/// Metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Bucket-relative key.
    pub path: String,
    pub size: usize,
    pub last_modified: DateTime<Utc>,
}

impl ObjectInfo {
    /// Last path segment of the key.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// One level of a delimited listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub objects: Vec<ObjectInfo>,
    /// Common prefixes ("directories"), without trailing delimiter.
    pub prefixes: Vec<String>,
}

/// Read access to one bucket.
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Read a whole object.
    async fn get(&self, path: &str) -> RadarResult<Bytes>;

    /// Read the half-open byte range `range` of an object.
    async fn get_range(&self, path: &str, range: Range<usize>) -> RadarResult<Bytes>;

    /// Fetch object metadata without the body.
    async fn head(&self, path: &str) -> RadarResult<ObjectInfo>;

    /// Recursively list every object under `prefix`.
    async fn list(&self, prefix: &str) -> RadarResult<Vec<ObjectInfo>>;

    /// List one level under `prefix` using `/` as the delimiter.
    async fn list_with_delimiter(&self, prefix: &str) -> RadarResult<Listing>;
}
