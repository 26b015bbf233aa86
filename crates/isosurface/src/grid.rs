//! Resampling of polar sweeps onto a regular scalar grid.
//!
//! Axes are gate index (x), azimuth row (y) and elevation index (z). Coarse
//! radials are duplicated so that every elevation lines up with the finest
//! azimuth resolution of the lowest elevation.

use radar_common::{Gate, RadialSet};
use tracing::warn;

use crate::error::{IsosurfaceError, IsosurfaceResult};

/// Grid value for gates that hold no measurement.
pub const GATE_EMPTY_VALUE: f32 = -9999.0;

/// A dense `depth x height x width` grid stored elevation-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    /// Gates per row.
    pub width: usize,
    /// Azimuth rows per elevation.
    pub height: usize,
    /// Elevations.
    pub depth: usize,
    pub data: Vec<f32>,
    /// Radial index in the lowest elevation that produced each row.
    pub row_radials: Vec<usize>,
}

/// How many grid rows a radial of `width` occupies at `target` resolution.
pub fn azimuth_repeat(width: f64, target: f64) -> usize {
    let repeat = (width / target).round();
    if repeat.is_finite() && repeat >= 1.0 {
        repeat as usize
    } else {
        1
    }
}

impl ScalarGrid {
    /// Build the grid from sweeps already sorted by elevation, radials sorted
    /// by azimuth.
    ///
    /// Returns `Ok(None)` when there is nothing to triangulate: no sweeps, a
    /// lowest sweep without radials, or no gates anywhere.
    pub fn build(sweeps: &[RadialSet], row_mismatch_tolerance: f64) -> IsosurfaceResult<Option<Self>> {
        let Some(baseline) = sweeps.first() else {
            return Ok(None);
        };
        if baseline.radials.is_empty() {
            return Ok(None);
        }

        let width = sweeps.iter().map(RadialSet::max_gate_count).max().unwrap_or(0);
        if width == 0 {
            return Ok(None);
        }

        let target = baseline
            .radials
            .iter()
            .map(|r| r.azimuth_width)
            .fold(f64::INFINITY, f64::min);
        if !(target.is_finite() && target > 0.0) {
            return Err(IsosurfaceError::InvalidAzimuthWidth(target));
        }

        let row_radials: Vec<usize> = baseline
            .radials
            .iter()
            .enumerate()
            .flat_map(|(i, r)| std::iter::repeat(i).take(azimuth_repeat(r.azimuth_width, target)))
            .collect();
        let height = row_radials.len();
        let depth = sweeps.len();

        let mut data = Vec::with_capacity(depth * height * width);
        for (elevation_index, sweep) in sweeps.iter().enumerate() {
            let start = data.len();
            for radial in &sweep.radials {
                let repeat = azimuth_repeat(radial.azimuth_width, target);
                let row_start = data.len();
                data.extend(radial.gates.iter().take(width).map(gate_value));
                data.resize(row_start + width, GATE_EMPTY_VALUE);
                for _ in 1..repeat {
                    data.extend_from_within(row_start..row_start + width);
                }
            }

            let found_rows = (data.len() - start) / width;
            if found_rows != height {
                let allowed = (height as f64 * row_mismatch_tolerance).floor() as usize;
                if found_rows.abs_diff(height) > allowed {
                    return Err(IsosurfaceError::NonUniformAzimuthLayout {
                        elevation_index,
                        expected_rows: height,
                        found_rows,
                    });
                }
                warn!(
                    elevation_index,
                    expected_rows = height,
                    found_rows,
                    "Azimuth row count differs from lowest elevation; padding"
                );
                data.resize(start + height * width, GATE_EMPTY_VALUE);
            }
        }

        Ok(Some(Self {
            width,
            height,
            depth,
            data,
            row_radials,
        }))
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.index(x, y, z)]
    }
}

fn gate_value(gate: &Gate) -> f32 {
    gate.value().unwrap_or(GATE_EMPTY_VALUE)
}
