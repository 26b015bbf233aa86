//! Synthetic sweep generators.
//!
//! These generators create predictable, verifiable radial data patterns
//! that can be used across the test suite.

use radar_common::{ElevationSet, Gate, Radial, RadialSet, DEFAULT_RADIUS_METERS};

/// Creates one sweep with evenly spaced radials.
///
/// Each gate value is calculated as `value(radial_index, gate_index)`.
/// Radial `i` starts at `i * azimuth_width` degrees, so `radial_count`
/// radials of width `360 / radial_count` cover the full circle.
///
/// # Example
///
/// ```
/// use test_utils::create_radial_set;
///
/// let sweep = create_radial_set(0.5, 4, 3, 90.0, |az, gate| (az * 10 + gate) as f32);
/// assert_eq!(sweep.radials.len(), 4);
/// assert_eq!(sweep.radials[2].azimuth_angle, 180.0);
/// assert_eq!(sweep.radials[1].gates[2].value(), Some(12.0));
/// ```
pub fn create_radial_set<F>(
    elevation_angle: f64,
    radial_count: usize,
    gate_count: usize,
    azimuth_width: f64,
    value: F,
) -> RadialSet
where
    F: Fn(usize, usize) -> f32,
{
    let radials = (0..radial_count)
        .map(|az| Radial {
            azimuth_angle: az as f64 * azimuth_width,
            azimuth_width,
            start_range: 2125.0,
            gate_interval: 250.0,
            gates: (0..gate_count).map(|g| Gate::Value(value(az, g))).collect(),
        })
        .collect();

    RadialSet {
        lat: 40.865,
        lon: -72.864,
        radius: DEFAULT_RADIUS_METERS,
        elevation_angle,
        radials,
    }
}

/// Creates a uniform volume: every sweep has the same radial and gate counts.
///
/// Gate values come from `value(elevation_index, radial_index, gate_index)`.
pub fn create_elevation_set<F>(
    elevation_angles: &[f64],
    radial_count: usize,
    gate_count: usize,
    value: F,
) -> ElevationSet
where
    F: Fn(usize, usize, usize) -> f32,
{
    let width = 360.0 / radial_count.max(1) as f64;
    elevation_angles
        .iter()
        .enumerate()
        .map(|(e, &angle)| {
            create_radial_set(angle, radial_count, gate_count, width, |az, g| {
                value(e, az, g)
            })
        })
        .collect()
}

/// Creates a volume holding a single storm cell.
///
/// Gates inside the box `radials x gates` on every elevation except the
/// last read `peak`; everything else reads `background`. The isosurface of
/// any threshold between the two is closed and non-empty.
pub fn create_storm_cell(
    elevation_angles: &[f64],
    radial_count: usize,
    gate_count: usize,
    radials: std::ops::Range<usize>,
    gates: std::ops::Range<usize>,
    peak: f32,
    background: f32,
) -> ElevationSet {
    let top = elevation_angles.len().saturating_sub(1);
    create_elevation_set(elevation_angles, radial_count, gate_count, |e, az, g| {
        if e < top && radials.contains(&az) && gates.contains(&g) {
            peak
        } else {
            background
        }
    })
}

/// Creates a sweep whose radials alternate between two azimuth widths.
///
/// Useful for testing layouts that mix super-resolution and legacy radials.
pub fn create_mixed_width_radial_set(
    elevation_angle: f64,
    narrow_count: usize,
    wide_count: usize,
    gate_count: usize,
) -> RadialSet {
    let mut sweep = create_radial_set(elevation_angle, narrow_count, gate_count, 0.5, |_, _| 10.0);
    let offset = narrow_count as f64 * 0.5;
    sweep.radials.extend((0..wide_count).map(|i| Radial {
        azimuth_angle: offset + i as f64,
        azimuth_width: 1.0,
        start_range: 2125.0,
        gate_interval: 250.0,
        gates: vec![Gate::Value(10.0); gate_count],
    }));
    sweep
}
