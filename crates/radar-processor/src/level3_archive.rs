//! Level III daily archives.
//!
//! Historic products are published as one gzipped tarball per site and day
//! (see [`storage::paths::level3_archive_path`]). Member names look like
//! `KOKX_SDUS51_N0QOKX_202109020123`: the third `_` field starts with the
//! three-letter product code.

use flate2::read::GzDecoder;
use radar_common::{is_mdm_file, RadarError, RadarResult};
use std::io::Read;

fn open(data: &[u8]) -> tar::Archive<GzDecoder<&[u8]>> {
    tar::Archive::new(GzDecoder::new(data))
}

fn archive_error(e: std::io::Error) -> RadarError {
    RadarError::Decode(format!("Level III archive: {}", e))
}

/// Base name of a regular-file entry; `None` for directories and links.
fn file_name<R: Read>(entry: &tar::Entry<'_, R>) -> RadarResult<Option<String>> {
    if !entry.header().entry_type().is_file() {
        return Ok(None);
    }
    let path = entry.path().map_err(archive_error)?;
    Ok(path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string))
}

/// Product code of an archived member name, if it has one.
fn product_code(name: &str) -> Option<String> {
    let field = name.split('_').nth(2)?;
    if field.chars().count() < 3 {
        return None;
    }
    Some(field.chars().take(3).collect())
}

/// Names of the members of one product, without `_MDM` sidecars, in
/// archive order.
pub fn list_products(data: &[u8], product: &str) -> RadarResult<Vec<String>> {
    let mut archive = open(data);
    let mut names = Vec::new();
    for entry in archive.entries().map_err(archive_error)? {
        let entry = entry.map_err(archive_error)?;
        let Some(name) = file_name(&entry)? else {
            continue;
        };
        if is_mdm_file(&name) {
            continue;
        }
        if product_code(&name).is_some_and(|code| code.eq_ignore_ascii_case(product)) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Bytes of the member whose base name is `wanted`.
pub fn extract_product(data: &[u8], wanted: &str) -> RadarResult<Vec<u8>> {
    let mut archive = open(data);
    for entry in archive.entries().map_err(archive_error)? {
        let mut entry = entry.map_err(archive_error)?;
        if file_name(&entry)?.as_deref() != Some(wanted) {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).map_err(archive_error)?;
        return Ok(bytes);
    }
    Err(RadarError::NotFound(format!("{} not in Level III archive", wanted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::build_level3_archive;

    fn sample() -> Vec<u8> {
        build_level3_archive(&[
            ("KOKX_SDUS51_N0QOKX_202109020123", b"first".to_vec()),
            ("KOKX_SDUS51_N0UOKX_202109020123", b"velocity".to_vec()),
            ("KOKX_SDUS51_N0QOKX_202109020128", b"second".to_vec()),
            ("KOKX_SDUS51_N0QOKX_202109020130_MDM", b"sidecar".to_vec()),
            ("KOKX_SHORT", b"no product field".to_vec()),
            ("nested/KOKX_SDUS51_N0QOKX_202109020135", b"third".to_vec()),
        ])
    }

    #[test]
    fn test_product_code() {
        assert_eq!(product_code("KOKX_SDUS51_N0QOKX_202109020123").as_deref(), Some("N0Q"));
        assert_eq!(product_code("KOKX_SDUS51_N0").as_deref(), None);
        assert_eq!(product_code("KOKX_SHORT"), None);
        assert_eq!(product_code("KOKX_SDUS51_ÉÉÉOKX").as_deref(), Some("ÉÉÉ"));
    }

    #[test]
    fn test_list_filters_product_and_mdm() {
        let names = list_products(&sample(), "n0q").unwrap();
        assert_eq!(
            names,
            vec![
                "KOKX_SDUS51_N0QOKX_202109020123",
                "KOKX_SDUS51_N0QOKX_202109020128",
                "KOKX_SDUS51_N0QOKX_202109020135",
            ]
        );
    }

    #[test]
    fn test_extract_by_base_name() {
        let data = sample();
        assert_eq!(extract_product(&data, "KOKX_SDUS51_N0UOKX_202109020123").unwrap(), b"velocity");
        assert_eq!(extract_product(&data, "KOKX_SDUS51_N0QOKX_202109020135").unwrap(), b"third");
    }

    #[test]
    fn test_extract_missing_member() {
        let err = extract_product(&sample(), "KOKX_SDUS51_N0QOKX_209901010000").unwrap_err();
        assert!(matches!(err, RadarError::NotFound(_)));
    }

    #[test]
    fn test_not_gzip_is_decode_error() {
        let err = list_products(b"plainly not a tarball", "N0Q").unwrap_err();
        assert!(matches!(err, RadarError::Decode(_)));
    }
}
