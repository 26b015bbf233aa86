//! Application state for the radar API.

use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use radar_processor::{RadarDataService, VolumeIndexCache};
use std::sync::Arc;
use storage::ObjectStorage;
use tracing::info;

use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    /// Data access for every route.
    pub service: RadarDataService,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState from environment configuration.
    pub async fn new(prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let config = ApiConfig::from_env();
        config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;

        let archive = Arc::new(ObjectStorage::new(&config.archive)?);
        let realtime = Arc::new(ObjectStorage::new(&config.realtime)?);
        let level3 = Arc::new(ObjectStorage::new(&config.level3)?);
        let level3_archive = Arc::new(ObjectStorage::new(&config.level3_archive)?);
        info!(
            archive = %config.archive.bucket,
            realtime = %config.realtime.bucket,
            level3 = %config.level3.bucket,
            level3_archive = %config.level3_archive.bucket,
            "Configured object storage"
        );

        // Lives for the whole process; entries are never evicted.
        let cache = Arc::new(VolumeIndexCache::new());
        let service = RadarDataService::new(archive, cache, config.processor)
            .with_realtime(realtime)
            .with_level3(level3)
            .with_level3_archive(level3_archive);

        Ok(Self::from_service(service, prometheus))
    }

    pub fn from_service(service: RadarDataService, prometheus: Option<PrometheusHandle>) -> Self {
        Self {
            service,
            prometheus,
        }
    }
}
