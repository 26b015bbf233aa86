//! Tests for ObjectStorage against an in-memory store.

use bytes::Bytes;
use object_store::memory::InMemory;
use radar_common::RadarError;
use std::sync::Arc;
use storage::{ObjectReader, ObjectStorage};

async fn seeded() -> ObjectStorage {
    let storage = ObjectStorage::from_store(Arc::new(InMemory::new()), "test-bucket");
    for key in [
        "2021/09/02/KOKX/KOKX20210902_012345_V06",
        "2021/09/02/KOKX/KOKX20210902_012000_V06_MDM",
        "2021/09/02/KTLX/KTLX20210902_012500_V06",
    ] {
        storage
            .put(key, Bytes::from_static(b"0123456789"))
            .await
            .unwrap();
    }
    storage
}

#[tokio::test]
async fn test_get_and_range() {
    let storage = seeded().await;

    let all = storage
        .get("2021/09/02/KOKX/KOKX20210902_012345_V06")
        .await
        .unwrap();
    assert_eq!(all.as_ref(), b"0123456789");

    let part = storage
        .get_range("2021/09/02/KOKX/KOKX20210902_012345_V06", 2..5)
        .await
        .unwrap();
    assert_eq!(part.as_ref(), b"234");

    let stats = storage.stats();
    assert_eq!(stats.get_requests, 1);
    assert_eq!(stats.range_requests, 1);
    assert_eq!(stats.bytes_read, 13);
}

#[tokio::test]
async fn test_missing_object_is_not_found() {
    let storage = seeded().await;
    let err = storage.get("2021/09/02/KOKX/nope").await.unwrap_err();
    assert!(matches!(err, RadarError::NotFound(_)));
    assert_eq!(err.http_status_code(), 404);
}

#[tokio::test]
async fn test_head_reports_size() {
    let storage = seeded().await;
    let info = storage
        .head("2021/09/02/KTLX/KTLX20210902_012500_V06")
        .await
        .unwrap();
    assert_eq!(info.size, 10);
    assert_eq!(info.file_name(), "KTLX20210902_012500_V06");
    assert_eq!(storage.stats().head_requests, 1);
}

#[tokio::test]
async fn test_list_recursive() {
    let storage = seeded().await;
    let objects = storage.list("2021/09/02/KOKX").await.unwrap();
    assert_eq!(objects.len(), 2);
    assert!(objects.iter().all(|o| o.path.starts_with("2021/09/02/KOKX/")));
}

#[tokio::test]
async fn test_list_with_delimiter_returns_site_prefixes() {
    let storage = seeded().await;
    let listing = storage.list_with_delimiter("2021/09/02/").await.unwrap();

    assert!(listing.objects.is_empty());
    let mut prefixes = listing.prefixes.clone();
    prefixes.sort();
    assert_eq!(prefixes, vec!["2021/09/02/KOKX", "2021/09/02/KTLX"]);
    assert_eq!(storage.stats().list_requests, 1);
}
