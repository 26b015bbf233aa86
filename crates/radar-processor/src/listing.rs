//! Directory listings over the archive and Level III buckets.

use chrono::{Days, NaiveDate};
use radar_common::{is_mdm_file, RadarError, RadarResult};
use std::str::FromStr;
use storage::paths::{
    archive_day_prefix, archive_site_prefix, level3_product_prefix, level3_root_prefix,
    level3_site,
};
use storage::{ObjectInfo, ObjectReader};
use tracing::{debug, instrument};

/// Which day a volume listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDate {
    Day(NaiveDate),
    /// The newest files across a lookback window.
    Latest,
}

impl FromStr for FileDate {
    type Err = RadarError;

    /// Parses `YYYYMMDD` or `latest`. An empty string means `latest`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("latest") {
            return Ok(FileDate::Latest);
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(FileDate::Day)
            .map_err(|_| RadarError::invalid_parameter("date", format!("'{}' is not YYYYMMDD", s)))
    }
}

fn last_segment(prefix: &str) -> String {
    prefix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(prefix)
        .to_string()
}

/// Site directories present in the archive for `date`.
#[instrument(skip(reader))]
pub async fn list_sites(reader: &dyn ObjectReader, date: NaiveDate) -> RadarResult<Vec<String>> {
    let listing = reader.list_with_delimiter(&archive_day_prefix(date)).await?;
    let mut sites: Vec<String> = listing.prefixes.iter().map(|p| last_segment(p)).collect();
    sites.sort();
    Ok(sites)
}

/// Volume files for one site and day, without `_MDM` sidecars, in key order.
#[instrument(skip(reader))]
pub async fn list_volume_files(
    reader: &dyn ObjectReader,
    site: &str,
    date: NaiveDate,
) -> RadarResult<Vec<ObjectInfo>> {
    let mut files: Vec<ObjectInfo> = reader
        .list(&archive_site_prefix(date, site))
        .await?
        .into_iter()
        .filter(|o| !is_mdm_file(o.file_name()))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// The `limit` most recently modified volume files, searching back from
/// `today` one day at a time until `limit` files are found or `days` days
/// have been searched. Returned oldest first.
#[instrument(skip(reader))]
pub async fn list_latest_volume_files(
    reader: &dyn ObjectReader,
    site: &str,
    today: NaiveDate,
    days: u32,
    limit: usize,
) -> RadarResult<Vec<ObjectInfo>> {
    let mut files = Vec::new();
    for back in 0..days {
        let Some(day) = today.checked_sub_days(Days::new(back as u64)) else {
            break;
        };
        files.extend(list_volume_files(reader, site, day).await?);
        if files.len() >= limit {
            break;
        }
    }

    files.sort_by(|a, b| {
        a.last_modified
            .cmp(&b.last_modified)
            .then_with(|| a.path.cmp(&b.path))
    });
    let excess = files.len().saturating_sub(limit);
    files.drain(..excess);

    debug!(count = files.len(), "Listed latest volume files");
    Ok(files)
}

/// Sites with Level III products under `root`.
#[instrument(skip(reader))]
pub async fn list_level3_sites(reader: &dyn ObjectReader, root: &str) -> RadarResult<Vec<String>> {
    let listing = reader.list_with_delimiter(&level3_root_prefix(root)).await?;
    let mut sites: Vec<String> = listing.prefixes.iter().map(|p| last_segment(p)).collect();
    sites.sort();
    Ok(sites)
}

/// Product codes published for one site.
#[instrument(skip(reader))]
pub async fn list_level3_products(
    reader: &dyn ObjectReader,
    root: &str,
    site: &str,
) -> RadarResult<Vec<String>> {
    let prefix = format!("{}{}/", level3_root_prefix(root), level3_site(site));
    let listing = reader.list_with_delimiter(&prefix).await?;
    let mut products: Vec<String> = listing.prefixes.iter().map(|p| last_segment(p)).collect();
    products.sort();
    Ok(products)
}

/// Files of one Level III product, without `_MDM` sidecars, in key order.
#[instrument(skip(reader))]
pub async fn list_level3_files(
    reader: &dyn ObjectReader,
    root: &str,
    site: &str,
    product: &str,
) -> RadarResult<Vec<ObjectInfo>> {
    let mut files: Vec<ObjectInfo> = reader
        .list(&level3_product_prefix(root, site, product))
        .await?
        .into_iter()
        .filter(|o| !is_mdm_file(o.file_name()))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_date_parse() {
        assert_eq!("latest".parse::<FileDate>().unwrap(), FileDate::Latest);
        assert_eq!("".parse::<FileDate>().unwrap(), FileDate::Latest);
        assert_eq!(
            "20210902".parse::<FileDate>().unwrap(),
            FileDate::Day(NaiveDate::from_ymd_opt(2021, 9, 2).unwrap())
        );
    }

    #[test]
    fn test_file_date_rejects_garbage() {
        let err = "2021-09-02".parse::<FileDate>().unwrap_err();
        assert!(matches!(err, RadarError::InvalidParameter { ref param, .. } if param == "date"));
        assert!("20211345".parse::<FileDate>().is_err());
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("2021/09/02/KOKX"), "KOKX");
        assert_eq!(last_segment("NIDS/OKX/"), "OKX");
        assert_eq!(last_segment("KOKX"), "KOKX");
    }
}
