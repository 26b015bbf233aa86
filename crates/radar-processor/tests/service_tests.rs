//! End-to-end tests of RadarDataService over in-memory buckets.

mod common;

use common::*;
use radar_common::{Moment, RadarError};
use radar_decode::normalize::radial_set_from_level2;
use radar_decode::Archive2;
use radar_processor::{RadarProcessorConfig, VolumeSource};
use std::sync::Arc;
use test_utils::assert_approx_eq;

fn full_decode() -> Archive2 {
    let (data, _) = standard_volume();
    Archive2::extract(&data).unwrap()
}

// =============================================================================
// Metadata cache
// =============================================================================

#[tokio::test]
async fn test_metadata_miss_then_hit() {
    let archive = seeded_archive().await;
    let service = service(archive.clone());

    let (first, volume) = service.volume_metadata(FILENAME).await.unwrap();
    assert!(volume.is_some(), "miss should hand back the decoded volume");

    let (second, volume) = service.volume_metadata(FILENAME).await.unwrap();
    assert!(volume.is_none(), "hit should not decode");
    assert!(Arc::ptr_eq(&first, &second));

    let storage_stats = archive.stats();
    assert_eq!(storage_stats.get_requests, 1);
    assert_eq!(storage_stats.range_requests, 0);

    let cache_stats = service.cache_stats().await;
    assert_eq!(cache_stats.hits, 1);
    assert_eq!(cache_stats.misses, 1);
    assert_eq!(cache_stats.entries, 1);
}

#[tokio::test]
async fn test_metadata_matches_file_layout() {
    let archive = seeded_archive().await;
    let service = service(archive);
    let (_, offsets) = standard_volume();

    let (metadata, _) = service.volume_metadata(FILENAME).await.unwrap();
    assert_eq!(metadata.ldm_offsets, offsets);
    assert_eq!(metadata.elevation_chunks.elevations().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(
        metadata.elevation_chunks.offsets(1),
        Some(&[offsets[1], offsets[2]][..])
    );
    assert_eq!(
        metadata.elevation_chunks.offsets(2),
        Some(&[offsets[2], offsets[3], offsets[4]][..])
    );
    assert_eq!(
        metadata.elevation_chunks.offsets(3),
        Some(&[offsets[4], offsets[5]][..])
    );
}

#[tokio::test]
async fn test_offsets_strictly_increasing() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let (metadata, _) = service.volume_metadata(FILENAME).await.unwrap();
    for elevation in metadata.elevation_chunks.elevations() {
        let offsets = metadata.elevation_chunks.offsets(elevation).unwrap();
        assert!(
            offsets.windows(2).all(|w| w[0] < w[1]),
            "elevation {} offsets not strictly increasing: {:?}",
            elevation,
            offsets
        );
    }
}

#[tokio::test]
async fn test_invalid_filename_does_no_io() {
    let archive = seeded_archive().await;
    let service = service(archive.clone());

    let err = service.volume_metadata("KOKX2021").await.unwrap_err();
    assert!(matches!(err, RadarError::InvalidFilename { .. }));
    assert_eq!(archive.stats().get_requests, 0);
}

#[tokio::test]
async fn test_missing_volume_is_not_found() {
    let archive = memory_storage("empty");
    let service = service(archive);

    let err = service.volume_metadata(FILENAME).await.unwrap_err();
    assert_eq!(err.http_status_code(), 404);
}

// =============================================================================
// Elevation assembly
// =============================================================================

#[tokio::test]
async fn test_cold_elevation_filters_full_decode() {
    let archive = seeded_archive().await;
    let service = service(archive.clone());

    let assembled = service.elevation_volume(FILENAME, 2).await.unwrap();
    assert_eq!(assembled.source, VolumeSource::FullDecode);
    assert!(assembled.is_complete());
    assert_eq!(assembled.volume.elevation_scans.len(), 1);
    assert_eq!(assembled.volume.elevation(2).map(|r| r.len()), Some(8));
    assert_eq!(archive.stats().range_requests, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_partial_fetch_matches_full_decode() {
    let archive = seeded_archive().await;
    let service = service(archive.clone());
    let full = full_decode();

    service.volume_metadata(FILENAME).await.unwrap();
    let file_size = archive.stats().bytes_read;

    for elevation in 1..=3u8 {
        let before = archive.stats().bytes_read;
        let assembled = service.elevation_volume(FILENAME, elevation).await.unwrap();
        let transferred = archive.stats().bytes_read - before;

        assert_eq!(assembled.source, VolumeSource::PartialFetch);
        assert!(assembled.is_complete());
        assert_eq!(
            assembled.volume.elevation(elevation),
            full.elevation(elevation),
            "elevation {} differs from full decode",
            elevation
        );
        assert_eq!(assembled.volume.elevation_scans.len(), 1);
        assert!(
            transferred < file_size,
            "elevation {} read {} of {} bytes",
            elevation,
            transferred,
            file_size
        );
    }

    assert_eq!(archive.stats().get_requests, 1);
}

#[tokio::test]
async fn test_partial_fetch_keeps_header_fields() {
    let archive = seeded_archive().await;
    let service = service(archive);
    let full = full_decode();

    service.volume_metadata(FILENAME).await.unwrap();
    let assembled = service.elevation_volume(FILENAME, 1).await.unwrap();

    assert_eq!(assembled.volume.header, full.header);
    let vcp = assembled.volume.vcp.expect("VCP from the metadata record");
    assert_eq!(vcp.pattern_number, 212);
}

#[tokio::test]
async fn test_unknown_elevation() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let cold = service.elevation_volume(FILENAME, 9).await.unwrap_err();
    assert!(matches!(cold, RadarError::ElevationNotFound(9)));

    let warm = service.elevation_volume(FILENAME, 9).await.unwrap_err();
    assert!(matches!(warm, RadarError::ElevationNotFound(9)));
}

// =============================================================================
// Sweeps and elevation sets
// =============================================================================

#[tokio::test]
async fn test_radial_set_cold_and_warm_agree() {
    let archive = seeded_archive().await;
    let service = service(archive);
    let full = full_decode();
    let expected = radial_set_from_level2(full.elevation(2).unwrap(), Moment::Reflectivity).unwrap();

    let cold = service.radial_set(FILENAME, Moment::Reflectivity, 2).await.unwrap();
    let warm = service.radial_set(FILENAME, Moment::Reflectivity, 2).await.unwrap();

    assert_eq!(cold, expected);
    assert_eq!(warm, expected);
    assert_eq!(warm.radials.len(), 8);
    assert_approx_eq!(warm.elevation_angle, 1.5, 1e-6);
}

#[tokio::test]
async fn test_radial_set_missing_moment() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let err = service
        .radial_set(FILENAME, Moment::Velocity, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, RadarError::MomentNotAvailable { elevation: 1, .. }));
    assert_eq!(err.http_status_code(), 404);
}

#[tokio::test]
async fn test_elevation_set_sorted_by_angle() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let set = service
        .elevation_set(FILENAME, Moment::Reflectivity)
        .await
        .unwrap();
    let angles: Vec<f64> = set.iter().map(|s| s.elevation_angle).collect();
    assert_eq!(angles.len(), 3);
    assert_approx_eq!(angles[0], 0.5, 1e-6);
    assert_approx_eq!(angles[1], 1.5, 1e-6);
    assert_approx_eq!(angles[2], 2.4, 1e-6);
}

#[tokio::test]
async fn test_elevation_set_skips_cuts_without_moment() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let set = service.elevation_set(FILENAME, Moment::Velocity).await.unwrap();
    assert_eq!(set.len(), 2);

    let err = service
        .elevation_set(FILENAME, Moment::CorrelationCoefficient)
        .await
        .unwrap_err();
    assert!(matches!(err, RadarError::MomentNotAvailable { .. }));
}

#[tokio::test]
async fn test_full_volume_warms_cache() {
    let archive = seeded_archive().await;
    let service = service(archive.clone());

    let volume = service.full_volume(FILENAME).await.unwrap();
    assert_eq!(volume.radial_count(), 24);

    let (_, decoded) = service.volume_metadata(FILENAME).await.unwrap();
    assert!(decoded.is_none());
    assert_eq!(archive.stats().get_requests, 1);
}

// =============================================================================
// Isosurface
// =============================================================================

#[tokio::test]
async fn test_isosurface_over_volume() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let triangles = service
        .isosurface(FILENAME, Moment::Reflectivity, 10.0)
        .await
        .unwrap();
    assert!(!triangles.is_empty());

    // Everything stays within the outermost gate (2125 + 11 * 250 meters).
    for t in &triangles {
        for v in [t.v1, t.v2, t.v3] {
            assert!((v.x * v.x + v.y * v.y + v.z * v.z).sqrt() < 5_000.0);
        }
    }
}

#[tokio::test]
async fn test_isosurface_above_every_gate_is_empty() {
    let archive = seeded_archive().await;
    let service = service(archive);

    let triangles = service
        .isosurface(FILENAME, Moment::Reflectivity, 500.0)
        .await
        .unwrap();
    assert!(triangles.is_empty());
}

#[tokio::test]
async fn test_isosurface_uses_configured_tolerance() {
    let archive = seeded_archive().await;
    let config = RadarProcessorConfig {
        isosurface_row_tolerance: 0.5,
        ..Default::default()
    };
    let service = service_with(archive, config);
    assert_approx_eq!(service.config().isosurface_row_tolerance, 0.5, 1e-12);

    let triangles = service
        .isosurface(FILENAME, Moment::Velocity, 0.0)
        .await
        .unwrap();
    // Constant velocity everywhere: no crossing.
    assert!(triangles.is_empty());
}
