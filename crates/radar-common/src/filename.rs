//! Volume filename convention: `SSSSYYYYMMDD_HHMMSS[_suffix]`.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::str::FromStr;

use crate::error::{RadarError, RadarResult};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const SITE_LEN: usize = 4;
const TIMESTAMP_LEN: usize = 15;

/// A parsed Level II volume filename such as `KOKX20210902_000428_V06`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFilename {
    pub name: String,
    pub site: String,
    pub timestamp: DateTime<Utc>,
}

impl VolumeFilename {
    /// Parse a filename into site and scan start time.
    pub fn parse(name: &str) -> RadarResult<Self> {
        let invalid = |reason: &str| RadarError::InvalidFilename {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if !name.is_ascii() {
            return Err(invalid("filename must be ASCII"));
        }
        if name.len() < SITE_LEN + TIMESTAMP_LEN {
            return Err(invalid("too short for site and timestamp"));
        }

        let site = &name[..SITE_LEN];
        if !site.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("site must be 4 alphanumeric characters"));
        }

        let stamp = &name[SITE_LEN..SITE_LEN + TIMESTAMP_LEN];
        let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .map_err(|e| invalid(&format!("bad timestamp {:?}: {}", stamp, e)))?;

        let rest = &name[SITE_LEN + TIMESTAMP_LEN..];
        if !rest.is_empty() && !rest.starts_with('_') && !rest.starts_with('.') {
            return Err(invalid("unexpected characters after timestamp"));
        }

        Ok(Self {
            name: name.to_string(),
            site: site.to_ascii_uppercase(),
            timestamp: naive.and_utc(),
        })
    }

    /// Object key in the archive bucket: `YYYY/MM/DD/SITE/<name>`.
    pub fn object_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.timestamp.format("%Y/%m/%d"),
            self.site,
            self.name
        )
    }
}

impl FromStr for VolumeFilename {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// True for metadata sidecar files, whose stem ends in `_MDM` (any case).
pub fn is_mdm_file(name: &str) -> bool {
    let base = name.rsplit('/').next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    stem.to_ascii_uppercase().ends_with("_MDM")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_standard_name() {
        let f = VolumeFilename::parse("KOKX20210902_000428_V06").unwrap();
        assert_eq!(f.site, "KOKX");
        assert_eq!(f.timestamp.year(), 2021);
        assert_eq!(f.timestamp.month(), 9);
        assert_eq!(f.timestamp.day(), 2);
        assert_eq!(f.timestamp.minute(), 4);
        assert_eq!(f.timestamp.second(), 28);
        assert_eq!(f.object_path(), "2021/09/02/KOKX/KOKX20210902_000428_V06");
    }

    #[test]
    fn test_parse_without_suffix() {
        let f: VolumeFilename = "KTLX20240115_235959".parse().unwrap();
        assert_eq!(f.object_path(), "2024/01/15/KTLX/KTLX20240115_235959");
    }

    #[test]
    fn test_rejects_bad_dates() {
        for name in [
            "KOKX20211302_000428_V06",
            "KOKX20210230_000428_V06",
            "KOKX20210902-000428_V06",
            "KOKX2021",
            "",
            "K*KX20210902_000428",
            "KOKX20210902_000428X",
        ] {
            let err = VolumeFilename::parse(name).unwrap_err();
            assert!(matches!(err, RadarError::InvalidFilename { .. }), "{}", name);
        }
    }

    #[test]
    fn test_is_mdm_file() {
        assert!(is_mdm_file("KOKX20210902_000428_V06_MDM"));
        assert!(is_mdm_file("2021/09/02/KOKX/KOKX20210902_000428_mdm"));
        assert!(is_mdm_file("KOKX_MDM.gz"));
        assert!(!is_mdm_file("KOKX20210902_000428_V06"));
        assert!(!is_mdm_file("MDM"));
    }
}
