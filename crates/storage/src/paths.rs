//! Object key layout of the NEXRAD buckets.
//!
//! | Bucket | Key |
//! |---|---|
//! | Level II archive | `YYYY/MM/DD/SITE/SITEYYYYMMDD_HHMMSS_V06` |
//! | Level II chunks | `SITE/VOLUME/YYYYMMDD-HHMMSS-CCC-T` |
//! | Level III real-time | `NIDS/SSS/PRODUCT/SSS_PRODUCT_YYYY_MM_DD_HH_MM_SS` |
//! | Level III archive | `YYYY/MM/DD/KSSS/NWS_NEXRAD_NXL3_KSSS_YYYYMMDD000000_YYYYMMDD235959.tar.gz` |
//!
//! The Level III layouts are those of the public Google Cloud buckets
//! `gcp-public-data-nexrad-l3-realtime` and `gcp-public-data-nexrad-l3`.
//! The real-time root (`NIDS`) is configurable; an empty root puts the site
//! directories at the top of the bucket.

use chrono::NaiveDate;

/// Day directory in the archive bucket: `YYYY/MM/DD/`.
pub fn archive_day_prefix(date: NaiveDate) -> String {
    date.format("%Y/%m/%d/").to_string()
}

/// Site directory for one day in the archive bucket: `YYYY/MM/DD/SITE`.
pub fn archive_site_prefix(date: NaiveDate, site: &str) -> String {
    format!("{}{}", archive_day_prefix(date), site.to_uppercase())
}

/// Chunk directory of one real-time volume: `SITE/VOLUME/`.
pub fn realtime_volume_prefix(site: &str, volume: u32) -> String {
    format!("{}/{}/", site.to_uppercase(), volume)
}

/// Level III sites drop the leading ICAO letter (`KOKX` -> `OKX`).
pub fn level3_site(site: &str) -> String {
    let site = site.to_uppercase();
    if site.chars().count() == 4 {
        site.chars().skip(1).collect()
    } else {
        site
    }
}

/// Four-letter site used by the Level III archive (`OKX` -> `KOKX`).
pub fn level3_archive_site(site: &str) -> String {
    let site = site.to_uppercase();
    if site.chars().count() == 3 {
        format!("K{}", site)
    } else {
        site
    }
}

/// Top of the Level III real-time tree: `root/`, or nothing for an empty root.
pub fn level3_root_prefix(root: &str) -> String {
    let root = root.trim_matches('/');
    if root.is_empty() {
        String::new()
    } else {
        format!("{}/", root)
    }
}

/// Product directory in the Level III bucket.
pub fn level3_product_prefix(root: &str, site: &str, product: &str) -> String {
    format!(
        "{}{}/{}/",
        level3_root_prefix(root),
        level3_site(site),
        product.to_uppercase()
    )
}

/// Full key of one Level III product file.
pub fn level3_object_path(root: &str, site: &str, product: &str, file_name: &str) -> String {
    format!("{}{}", level3_product_prefix(root, site, product), file_name)
}

/// Daily tarball of every Level III product a site issued on `date`.
pub fn level3_archive_path(date: NaiveDate, site: &str) -> String {
    let site = level3_archive_site(site);
    let day = date.format("%Y%m%d");
    format!(
        "{}{}/NWS_NEXRAD_NXL3_{}_{}000000_{}235959.tar.gz",
        archive_day_prefix(date),
        site,
        site,
        day,
        day
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 9, 2).unwrap()
    }

    #[test]
    fn test_archive_prefixes() {
        assert_eq!(archive_day_prefix(day()), "2021/09/02/");
        assert_eq!(archive_site_prefix(day(), "kokx"), "2021/09/02/KOKX");
    }

    #[test]
    fn test_realtime_prefix() {
        assert_eq!(realtime_volume_prefix("KOKX", 123), "KOKX/123/");
    }

    #[test]
    fn test_level3_paths() {
        assert_eq!(level3_site("KOKX"), "OKX");
        assert_eq!(level3_site("okx"), "OKX");
        assert_eq!(level3_product_prefix("NIDS", "KOKX", "n0q"), "NIDS/OKX/N0Q/");
        assert_eq!(level3_product_prefix("", "KOKX", "N0Q"), "OKX/N0Q/");
        assert_eq!(
            level3_object_path("NIDS/", "KOKX", "N0Q", "OKX_N0Q_2021_09_02_01_23_45"),
            "NIDS/OKX/N0Q/OKX_N0Q_2021_09_02_01_23_45"
        );
    }

    #[test]
    fn test_level3_site_non_ascii() {
        assert_eq!(level3_site("éab"), "ÉAB");
        assert_eq!(level3_site("kéab"), "ÉAB");
        assert_eq!(level3_product_prefix("NIDS", "éab", "N0Q"), "NIDS/ÉAB/N0Q/");
        assert_eq!(level3_archive_site("éab"), "KÉAB");
    }

    #[test]
    fn test_level3_root_prefix() {
        assert_eq!(level3_root_prefix("NIDS"), "NIDS/");
        assert_eq!(level3_root_prefix("/NIDS/"), "NIDS/");
        assert_eq!(level3_root_prefix(""), "");
    }

    #[test]
    fn test_level3_archive_path() {
        assert_eq!(level3_archive_site("okx"), "KOKX");
        assert_eq!(level3_archive_site("KOKX"), "KOKX");
        assert_eq!(
            level3_archive_path(day(), "OKX"),
            "2021/09/02/KOKX/NWS_NEXRAD_NXL3_KOKX_20210902000000_20210902235959.tar.gz"
        );
    }
}
