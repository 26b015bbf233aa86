//! Common test fixtures for radar data tests.

/// Sites used across the test suite.
pub mod sites {
    pub const KOKX: &str = "KOKX";
    pub const KTLX: &str = "KTLX";
}

/// Volume filenames in the formats the archive bucket holds.
pub mod filenames {
    /// A gzip-era name with a `.gz` suffix.
    pub const LEGACY_GZ: &str = "KTLX20130520_200356_V06.gz";
    /// Current naming: `_V06` suffix without extension.
    pub const V06: &str = "KOKX20210902_012345_V06";
    /// A volume with no suffix at all.
    pub const BARE: &str = "KOKX20210902_013000";
    /// Model data messages, excluded from listings.
    pub const MDM: &str = "KOKX20210902_012000_V06_MDM";
    /// Too short to hold a site and timestamp.
    pub const TOO_SHORT: &str = "KOKX2021";
}

/// Level III product codes and their file-name abbreviations.
pub mod products {
    /// Base reflectivity, 0.5 degrees.
    pub const N0Q: (&str, i16) = ("N0Q", 94);
    /// Base velocity, 0.5 degrees.
    pub const N0U: (&str, i16) = ("N0U", 99);
    /// Composite reflectivity: not an elevation product.
    pub const NCR: (&str, i16) = ("NCR", 37);
    /// Storm total precipitation (digital).
    pub const DTA: (&str, i16) = ("DTA", 172);
}

/// Object keys as they appear in the upstream buckets.
pub mod keys {
    /// Archive volume for [`super::filenames::V06`].
    pub const ARCHIVE_V06: &str = "2021/09/02/KOKX/KOKX20210902_012345_V06";
    /// The MDM file on the same day.
    pub const ARCHIVE_MDM: &str = "2021/09/02/KOKX/KOKX20210902_012000_V06_MDM";
    /// Level III product object.
    pub const LEVEL3_N0Q: &str = "NIDS/OKX/N0Q/OKX_N0Q_2021_09_02_01_23_45";
    /// Level III daily archive for KOKX on 2021-09-02.
    pub const LEVEL3_ARCHIVE: &str =
        "2021/09/02/KOKX/NWS_NEXRAD_NXL3_KOKX_20210902000000_20210902235959.tar.gz";
    /// Archived N0Q product inside [`LEVEL3_ARCHIVE`].
    pub const LEVEL3_ARCHIVED_N0Q: &str = "KOKX_SDUS51_N0QOKX_202109020123";
    /// Archived N0U product inside [`LEVEL3_ARCHIVE`].
    pub const LEVEL3_ARCHIVED_N0U: &str = "KOKX_SDUS51_N0UOKX_202109020123";
}
