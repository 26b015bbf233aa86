//! Tests for conversion into the canonical sweep representation.

use radar_common::{Gate, Moment};
use radar_decode::archive2::Archive2;
use radar_decode::level3::Level3Product;
use radar_decode::normalize::{radial_set_from_level2, radial_set_from_level3};
use radar_decode::DecodeError;
use test_utils::archive2::{standard_ref_raw, sweep};
use test_utils::{assert_approx_eq, Archive2Builder, Level3Builder, SyntheticMoment};

#[test]
fn test_level2_reflectivity_sweep() {
    let volume = Archive2::extract(&Archive2Builder::standard("KOKX").build()).unwrap();
    let sweep = radial_set_from_level2(volume.elevation(1).unwrap(), Moment::Reflectivity).unwrap();

    assert_approx_eq!(sweep.lat, 40.865, 1e-4);
    assert_approx_eq!(sweep.lon, -72.864, 1e-4);
    assert_approx_eq!(sweep.elevation_angle, 0.5, 1e-6);
    assert_eq!(sweep.radius, 460_000);
    assert_eq!(sweep.radials.len(), 8);

    let radial = &sweep.radials[5];
    assert_approx_eq!(radial.azimuth_angle, 225.0, 1e-6);
    assert_eq!(radial.azimuth_width, 1.0);
    assert_eq!(radial.start_range, 2125.0);
    assert_eq!(radial.gate_interval, 250.0);
    assert_eq!(radial.gate_count(), 12);

    let expected = (standard_ref_raw(1, 5, 7) as f32 - 66.0) / 2.0;
    assert_eq!(radial.gates[7], Gate::Value(expected));
}

#[test]
fn test_level2_missing_moment() {
    let volume = Archive2::extract(&Archive2Builder::standard("KOKX").build()).unwrap();
    let err = radial_set_from_level2(volume.elevation(1).unwrap(), Moment::Velocity).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::MomentNotAvailable { elevation: 1, .. }
    ));
}

#[test]
fn test_level2_empty_input() {
    assert!(matches!(
        radial_set_from_level2(&[], Moment::Reflectivity),
        Err(DecodeError::EmptyElevation(_))
    ));
}

#[test]
fn test_level2_threshold_markers() {
    let radials = sweep(1, 0.5, 2, 2, 4, |_, _| {
        vec![SyntheticMoment::reflectivity(vec![0, 1, 66, 86])]
    });
    let volume = Archive2::extract(&Archive2Builder::new("KOKX").record(radials).build()).unwrap();
    let sweep = radial_set_from_level2(volume.elevation(1).unwrap(), Moment::Reflectivity).unwrap();

    assert_eq!(
        sweep.radials[0].gates,
        vec![
            Gate::BelowThreshold,
            Gate::RangeFolded,
            Gate::Value(0.0),
            Gate::Value(10.0)
        ]
    );
}

#[test]
fn test_level3_sweep() {
    let data = Level3Builder::new("KOKX")
        .elevation_tenths(15)
        .range(2, 250)
        .radial(900, 10, vec![0, 4, 8])
        .build();
    let product = Level3Product::decode(&data).unwrap();
    let sweep = radial_set_from_level3(&product);

    assert_approx_eq!(sweep.lat, 40.865, 1e-9);
    assert_approx_eq!(sweep.lon, -72.864, 1e-9);
    assert_approx_eq!(sweep.elevation_angle, 1.5, 1e-9);

    let radial = &sweep.radials[0];
    assert_approx_eq!(radial.azimuth_angle, 90.0, 1e-9);
    assert_approx_eq!(radial.azimuth_width, 1.0, 1e-9);
    assert_eq!(radial.gate_interval, 250.0);
    assert_eq!(radial.start_range, 500.0);
    assert_eq!(
        radial.gates,
        vec![Gate::NoData, Gate::Value(4.0), Gate::Value(8.0)]
    );
}

#[test]
fn test_level3_non_elevation_product_and_default_spacing() {
    let data = Level3Builder::new("KOKX")
        .code(172)
        .product("DTA")
        .elevation_tenths(99)
        .radial(0, 10, vec![1])
        .build();
    let product = Level3Product::decode(&data).unwrap();
    let sweep = radial_set_from_level3(&product);

    assert_eq!(sweep.elevation_angle, 0.0);
    assert_eq!(sweep.radials[0].gate_interval, 1000.0);
    assert_eq!(sweep.radials[0].start_range, 0.0);
}
