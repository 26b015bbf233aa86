//! Error types for isosurface construction.

use radar_common::RadarError;
use thiserror::Error;

/// Result type alias for isosurface operations.
pub type IsosurfaceResult<T> = Result<T, IsosurfaceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IsosurfaceError {
    /// An elevation's grid row count strays too far from the lowest elevation's.
    #[error("elevation {elevation_index} has {found_rows} azimuth rows, expected {expected_rows}")]
    NonUniformAzimuthLayout {
        elevation_index: usize,
        expected_rows: usize,
        found_rows: usize,
    },

    /// The lowest elevation has no usable azimuth width to align rows against.
    #[error("invalid azimuth width {0}")]
    InvalidAzimuthWidth(f64),
}

impl From<IsosurfaceError> for RadarError {
    fn from(err: IsosurfaceError) -> Self {
        RadarError::Isosurface(err.to_string())
    }
}
