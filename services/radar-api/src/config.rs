//! Service configuration.

use radar_processor::RadarProcessorConfig;
use storage::ObjectStorageConfig;

pub const ARCHIVE_BUCKET: &str = "unidata-nexrad-level2";
pub const REALTIME_BUCKET: &str = "unidata-nexrad-level2-chunks";
/// Real-time Level III products under `NIDS/SSS/PRODUCT/`.
pub const LEVEL3_BUCKET: &str = "gcp-public-data-nexrad-l3-realtime";
/// Level III daily tarballs under `YYYY/MM/DD/KSSS/`.
pub const LEVEL3_ARCHIVE_BUCKET: &str = "gcp-public-data-nexrad-l3";

/// Bucket connections plus processor tuning.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub archive: ObjectStorageConfig,
    pub realtime: ObjectStorageConfig,
    pub level3: ObjectStorageConfig,
    pub level3_archive: ObjectStorageConfig,
    pub processor: RadarProcessorConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            archive: ObjectStorageConfig::public(ARCHIVE_BUCKET),
            realtime: ObjectStorageConfig::public(REALTIME_BUCKET),
            level3: ObjectStorageConfig::public_gcs(LEVEL3_BUCKET),
            level3_archive: ObjectStorageConfig::public_gcs(LEVEL3_ARCHIVE_BUCKET),
            processor: RadarProcessorConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from `ARCHIVE_*`, `REALTIME_*`, `LEVEL3_*`,
    /// `LEVEL3_ARCHIVE_*` and the processor's environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            archive: ObjectStorageConfig::from_env("ARCHIVE", defaults.archive),
            realtime: ObjectStorageConfig::from_env("REALTIME", defaults.realtime),
            level3: ObjectStorageConfig::from_env("LEVEL3", defaults.level3),
            level3_archive: ObjectStorageConfig::from_env(
                "LEVEL3_ARCHIVE",
                defaults.level3_archive,
            ),
            processor: RadarProcessorConfig::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.archive.validate()?;
        self.realtime.validate()?;
        self.level3.validate()?;
        self.level3_archive.validate()?;
        self.processor.validate()
    }
}
