//! Configuration for the radar processor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for partial fetches, listings and isosurfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarProcessorConfig {
    /// Upper bound on a single chunk fetch.
    pub chunk_fetch_timeout: Duration,

    /// Fraction of chunks allowed to fail before a partial fetch is rejected.
    /// `0.0` rejects on any failure.
    pub max_failed_chunk_ratio: f64,

    /// Allowed azimuth row mismatch between elevations, as a fraction of the
    /// lowest elevation's row count.
    pub isosurface_row_tolerance: f64,

    /// Files returned by a `latest` listing.
    pub latest_listing_limit: usize,

    /// Days searched backwards by a `latest` listing.
    pub latest_listing_days: u32,

    /// Root directory of Level III products in their bucket.
    pub level3_prefix: String,
}

impl Default for RadarProcessorConfig {
    fn default() -> Self {
        Self {
            chunk_fetch_timeout: Duration::from_secs(30),
            max_failed_chunk_ratio: 0.0,
            isosurface_row_tolerance: 0.02,
            latest_listing_limit: 100,
            latest_listing_days: 7,
            level3_prefix: "NIDS".to_string(),
        }
    }
}

impl RadarProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CHUNK_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.chunk_fetch_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("MAX_FAILED_CHUNK_RATIO") {
            if let Ok(ratio) = val.parse() {
                config.max_failed_chunk_ratio = ratio;
            }
        }

        if let Ok(val) = std::env::var("ISOSURFACE_ROW_TOLERANCE") {
            if let Ok(tolerance) = val.parse() {
                config.isosurface_row_tolerance = tolerance;
            }
        }

        if let Ok(val) = std::env::var("LATEST_LISTING_LIMIT") {
            if let Ok(limit) = val.parse() {
                config.latest_listing_limit = limit;
            }
        }

        if let Ok(val) = std::env::var("LATEST_LISTING_DAYS") {
            if let Ok(days) = val.parse() {
                config.latest_listing_days = days;
            }
        }

        if let Ok(val) = std::env::var("LEVEL3_PREFIX") {
            config.level3_prefix = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_fetch_timeout.is_zero() {
            return Err("chunk_fetch_timeout must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.max_failed_chunk_ratio) {
            return Err("max_failed_chunk_ratio must be within 0.0-1.0".to_string());
        }

        if !(0.0..1.0).contains(&self.isosurface_row_tolerance) {
            return Err("isosurface_row_tolerance must be within 0.0-1.0".to_string());
        }

        if self.latest_listing_limit == 0 {
            return Err("latest_listing_limit must be > 0".to_string());
        }

        if self.latest_listing_days == 0 {
            return Err("latest_listing_days must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RadarProcessorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.max_failed_chunk_ratio, 0.0);
        assert_eq!(config.latest_listing_limit, 100);
    }

    #[test]
    fn test_ratio_out_of_range() {
        let config = RadarProcessorConfig {
            max_failed_chunk_ratio: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let config = RadarProcessorConfig {
            chunk_fetch_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
