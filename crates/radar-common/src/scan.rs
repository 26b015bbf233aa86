//! Canonical polar scan representation.
//!
//! Every decoder normalizes into these types: an [`ElevationSet`] holds one
//! [`RadialSet`] per sweep, each sweep holds [`Radial`]s, and each radial
//! holds an ordered run of [`Gate`] samples along the beam.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// Maximum range drawn around a site, in meters.
pub const DEFAULT_RADIUS_METERS: u32 = 460_000;

/// One range-bin sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// A scaled measurement.
    Value(f32),
    /// No sample was recorded for this bin.
    NoData,
    /// The return was below the signal threshold.
    BelowThreshold,
    /// The return was range folded.
    RangeFolded,
}

impl Gate {
    /// The measured value, if present.
    pub fn value(&self) -> Option<f32> {
        match self {
            Gate::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Gate::Value(_))
    }
}

/// Gates serialize as a bare number, or `null` when there is no measurement.
impl Serialize for Gate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Gate::Value(v) => serializer.serialize_f32(*v),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Gate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<f32>::deserialize(deserializer)?;
        Ok(value.map_or(Gate::NoData, Gate::Value))
    }
}

/// A single beam at a fixed azimuth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Radial {
    /// Azimuth in degrees, clockwise from north.
    pub azimuth_angle: f64,
    /// Angular width of the beam in degrees.
    pub azimuth_width: f64,
    /// Distance to the first gate in meters.
    pub start_range: f64,
    /// Depth of each gate in meters.
    pub gate_interval: f64,
    pub gates: Vec<Gate>,
}

impl Radial {
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }
}

/// One elevation sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialSet {
    /// Latitude of the site.
    pub lat: f64,
    /// Longitude of the site.
    pub lon: f64,
    /// Distance from the site to the edge of the sweep in meters.
    pub radius: u32,
    /// Elevation angle in degrees.
    pub elevation_angle: f64,
    pub radials: Vec<Radial>,
}

impl RadialSet {
    /// Sort radials by azimuth, ascending.
    pub fn sort_by_azimuth(&mut self) {
        self.radials
            .sort_by(|a, b| a.azimuth_angle.partial_cmp(&b.azimuth_angle).unwrap_or(Ordering::Equal));
    }

    pub fn max_gate_count(&self) -> usize {
        self.radials.iter().map(Radial::gate_count).max().unwrap_or(0)
    }
}

/// An ordered collection of sweeps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElevationSet {
    pub sweeps: Vec<RadialSet>,
}

impl ElevationSet {
    pub fn new(sweeps: Vec<RadialSet>) -> Self {
        Self { sweeps }
    }

    pub fn push(&mut self, sweep: RadialSet) {
        self.sweeps.push(sweep);
    }

    pub fn len(&self) -> usize {
        self.sweeps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sweeps.is_empty()
    }

    /// Sort sweeps by elevation angle, ascending.
    pub fn sort_by_elevation(&mut self) {
        self.sweeps.sort_by(|a, b| {
            a.elevation_angle
                .partial_cmp(&b.elevation_angle)
                .unwrap_or(Ordering::Equal)
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RadialSet> {
        self.sweeps.iter()
    }
}

impl FromIterator<RadialSet> for ElevationSet {
    fn from_iter<I: IntoIterator<Item = RadialSet>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
