//! Object storage client for the NEXRAD buckets (S3 compatible).

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectMeta, ObjectStore};
use radar_common::{RadarError, RadarResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::reader::{Listing, ObjectInfo, ObjectReader};

/// Configuration for one bucket connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// Custom endpoint URL (MinIO, LocalStack). `None` uses AWS.
    pub endpoint: Option<String>,
    /// Bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Allow HTTP endpoints
    pub allow_http: bool,
    /// Send unsigned requests (public buckets)
    pub skip_signature: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// S3-compatible XML endpoint of Google Cloud Storage.
pub const GCS_ENDPOINT: &str = "https://storage.googleapis.com";

impl ObjectStorageConfig {
    /// Anonymous access to a public AWS bucket.
    pub fn public(bucket: &str) -> Self {
        Self {
            endpoint: None,
            bucket: bucket.to_string(),
            region: "us-east-1".to_string(),
            allow_http: false,
            skip_signature: true,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Anonymous access to a public Google Cloud bucket through its S3
    /// interoperability endpoint.
    pub fn public_gcs(bucket: &str) -> Self {
        Self {
            endpoint: Some(GCS_ENDPOINT.to_string()),
            region: "auto".to_string(),
            ..Self::public(bucket)
        }
    }

    /// Load configuration from `{prefix}_BUCKET`, `{prefix}_ENDPOINT`,
    /// `{prefix}_REGION`, `{prefix}_ALLOW_HTTP`, `{prefix}_SKIP_SIGNATURE`,
    /// `{prefix}_ACCESS_KEY` and `{prefix}_SECRET_KEY`. Unset variables keep
    /// the values in `defaults`. An empty `{prefix}_ENDPOINT` selects AWS.
    pub fn from_env(prefix: &str, defaults: Self) -> Self {
        let var = |name: &str| std::env::var(format!("{}_{}", prefix, name)).ok();
        let flag = |v: String| v.to_lowercase() == "true" || v == "1";

        let mut config = defaults;
        if let Some(bucket) = var("BUCKET") {
            config.bucket = bucket;
        }
        if let Some(endpoint) = var("ENDPOINT") {
            config.endpoint = Some(endpoint).filter(|e| !e.is_empty());
        }
        if let Some(region) = var("REGION") {
            config.region = region;
        }
        if let Some(v) = var("ALLOW_HTTP") {
            config.allow_http = flag(v);
        }
        config.access_key_id = var("ACCESS_KEY");
        config.secret_access_key = var("SECRET_KEY");
        config.skip_signature = match var("SKIP_SIGNATURE") {
            Some(v) => flag(v),
            None => config.access_key_id.is_none(),
        };
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("bucket must not be empty".to_string());
        }
        if !self.skip_signature
            && (self.access_key_id.is_none() || self.secret_access_key.is_none())
        {
            return Err(format!(
                "bucket {} requires credentials when signing is enabled",
                self.bucket
            ));
        }
        Ok(())
    }
}

/// Request accounting for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Whole-object GET requests
    pub get_requests: u64,
    /// Ranged GET requests
    pub range_requests: u64,
    pub head_requests: u64,
    pub list_requests: u64,
    /// Body bytes received by GET and ranged GET
    pub bytes_read: u64,
}

#[derive(Debug, Default)]
struct RequestCounters {
    get_requests: AtomicU64,
    range_requests: AtomicU64,
    head_requests: AtomicU64,
    list_requests: AtomicU64,
    bytes_read: AtomicU64,
}

/// Object storage client for radar data.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    counters: RequestCounters,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> RadarResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_allow_http(config.allow_http)
            .with_skip_signature(config.skip_signature);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            builder = builder
                .with_access_key_id(key)
                .with_secret_access_key(secret);
        }

        let store = builder
            .build()
            .map_err(|e| RadarError::NotConfigured(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self::from_store(Arc::new(store), &config.bucket))
    }

    /// Wrap an existing store, e.g. `object_store::memory::InMemory` in tests.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            counters: RequestCounters::default(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Write bytes to a path in the bucket. Used to seed test stores.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, path = %path))]
    pub async fn put(&self, path: &str, data: Bytes) -> RadarResult<()> {
        let location = Path::from(path);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data)
            .await
            .map_err(|e| map_error(path, "write", e))?;

        Ok(())
    }

    /// Snapshot of the request counters.
    pub fn stats(&self) -> StorageStats {
        let c = &self.counters;
        StorageStats {
            get_requests: c.get_requests.load(Ordering::Relaxed),
            range_requests: c.range_requests.load(Ordering::Relaxed),
            head_requests: c.head_requests.load(Ordering::Relaxed),
            list_requests: c.list_requests.load(Ordering::Relaxed),
            bytes_read: c.bytes_read.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl ObjectReader for ObjectStorage {
    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path))]
    async fn get(&self, path: &str) -> RadarResult<Bytes> {
        let location = Path::from(path);
        self.counters.get_requests.fetch_add(1, Ordering::Relaxed);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| map_error(path, "read", e))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| RadarError::transport(format!("Failed to read bytes of {}: {}", path, e)))?;

        self.counters
            .bytes_read
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path))]
    async fn get_range(&self, path: &str, range: Range<usize>) -> RadarResult<Bytes> {
        let location = Path::from(path);
        self.counters.range_requests.fetch_add(1, Ordering::Relaxed);

        let bytes = self
            .store
            .get_range(&location, range)
            .await
            .map_err(|e| map_error(path, "read range of", e))?;

        self.counters
            .bytes_read
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(bytes)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path))]
    async fn head(&self, path: &str) -> RadarResult<ObjectInfo> {
        let location = Path::from(path);
        self.counters.head_requests.fetch_add(1, Ordering::Relaxed);

        let meta = self
            .store
            .head(&location)
            .await
            .map_err(|e| map_error(path, "check", e))?;

        Ok(object_info(meta))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, prefix = %prefix))]
    async fn list(&self, prefix: &str) -> RadarResult<Vec<ObjectInfo>> {
        let prefix_path = Path::from(prefix);
        self.counters.list_requests.fetch_add(1, Ordering::Relaxed);

        let mut objects = Vec::new();
        let mut stream = self.store.list(Some(&prefix_path));
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| RadarError::transport(format!("List failed: {}", e)))?
        {
            objects.push(object_info(meta));
        }

        debug!(count = objects.len(), "Listed objects");
        Ok(objects)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, prefix = %prefix))]
    async fn list_with_delimiter(&self, prefix: &str) -> RadarResult<Listing> {
        let prefix_path = Path::from(prefix);
        self.counters.list_requests.fetch_add(1, Ordering::Relaxed);

        let result = self
            .store
            .list_with_delimiter(Some(&prefix_path))
            .await
            .map_err(|e| RadarError::transport(format!("List failed: {}", e)))?;

        Ok(Listing {
            objects: result.objects.into_iter().map(object_info).collect(),
            prefixes: result
                .common_prefixes
                .into_iter()
                .map(|p| p.to_string())
                .collect(),
        })
    }
}

fn object_info(meta: ObjectMeta) -> ObjectInfo {
    ObjectInfo {
        path: meta.location.to_string(),
        size: meta.size,
        last_modified: meta.last_modified,
    }
}

fn map_error(path: &str, action: &str, err: object_store::Error) -> RadarError {
    match err {
        object_store::Error::NotFound { .. } => RadarError::NotFound(path.to_string()),
        other => RadarError::transport(format!("Failed to {} {}: {}", action, path, other)),
    }
}
