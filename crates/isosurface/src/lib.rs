//! Isosurface extraction from radar volumes.
//!
//! A volume of polar sweeps is resampled onto a regular
//! `elevation x azimuth row x gate` grid ([`grid`]), triangulated at a
//! threshold ([`marching`]), and mapped back to Cartesian meters relative to
//! the radar, Z up.
//!
//! # Example
//!
//! ```ignore
//! use isosurface::{build_isosurface, obj::write_obj, IsosurfaceOptions};
//!
//! let triangles = build_isosurface(volume, 40.0, &IsosurfaceOptions::default())?;
//! let mut out = Vec::new();
//! write_obj(&triangles, &mut out)?;
//! ```

pub mod error;
pub mod grid;
pub mod marching;
pub mod obj;

pub use error::{IsosurfaceError, IsosurfaceResult};
pub use grid::{ScalarGrid, GATE_EMPTY_VALUE};

use radar_common::{ElevationSet, RadialSet};
use tracing::debug;

/// A point or direction in 3-D space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
}

impl Triangle {
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        Self { v1, v2, v3 }
    }
}

/// Tuning for [`build_isosurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsosurfaceOptions {
    /// Largest tolerated difference between an elevation's azimuth row count
    /// and the lowest elevation's, as a fraction of the latter.
    pub row_mismatch_tolerance: f64,
}

impl Default for IsosurfaceOptions {
    fn default() -> Self {
        Self {
            row_mismatch_tolerance: 0.02,
        }
    }
}

/// Build the `threshold` isosurface of a volume, in meters relative to the radar.
///
/// Sweeps are sorted by elevation angle and radials by azimuth first. An
/// empty volume, a single elevation, or a volume without gates yields no
/// triangles.
pub fn build_isosurface(
    mut elevations: ElevationSet,
    threshold: f32,
    options: &IsosurfaceOptions,
) -> IsosurfaceResult<Vec<Triangle>> {
    elevations.sort_by_elevation();
    for sweep in elevations.sweeps.iter_mut() {
        sweep.sort_by_azimuth();
    }

    let Some(grid) = ScalarGrid::build(&elevations.sweeps, options.row_mismatch_tolerance)? else {
        return Ok(Vec::new());
    };

    let triangles: Vec<Triangle> = marching::march(&grid, threshold)
        .into_iter()
        .map(|t| {
            Triangle::new(
                grid_to_cartesian(t.v1, &elevations.sweeps, &grid),
                grid_to_cartesian(t.v2, &elevations.sweeps, &grid),
                grid_to_cartesian(t.v3, &elevations.sweeps, &grid),
            )
        })
        .collect();

    debug!(
        width = grid.width,
        height = grid.height,
        depth = grid.depth,
        triangles = triangles.len(),
        threshold,
        "Built isosurface"
    );
    Ok(triangles)
}

/// Map a fractional grid coordinate `(gate, row, elevation)` to Cartesian space.
///
/// The elevation angle is interpolated between neighbouring sweeps. Azimuth
/// and gate geometry come from the lowest sweep's radial behind the nearest
/// row, converted from compass bearing to a math angle.
pub fn grid_to_cartesian(v: Vec3, sweeps: &[RadialSet], grid: &ScalarGrid) -> Vec3 {
    let last = sweeps.len().saturating_sub(1);
    let low = (v.z.floor().max(0.0) as usize).min(last);
    let high = (v.z.ceil().max(0.0) as usize).min(last);
    let low_angle = sweeps[low].elevation_angle;
    let high_angle = sweeps[high].elevation_angle;
    let elevation_angle = low_angle + (high_angle - low_angle) * (v.z - v.z.floor());

    let row = (v.y.round().max(0.0) as usize).min(grid.row_radials.len().saturating_sub(1));
    let radial = &sweeps[0].radials[grid.row_radials[row]];
    let angle = (90.0 - radial.azimuth_angle).to_radians();
    let range = radial.start_range + v.x * radial.gate_interval;

    Vec3::new(
        angle.cos() * range,
        angle.sin() * range,
        elevation_angle.to_radians().sin() * range,
    )
}
