//! Common types and utilities shared across the radar services.

pub mod error;
pub mod filename;
pub mod moment;
pub mod scan;

pub use error::{RadarError, RadarResult};
pub use filename::{is_mdm_file, VolumeFilename};
pub use moment::Moment;
pub use scan::{ElevationSet, Gate, Radial, RadialSet, DEFAULT_RADIUS_METERS};
