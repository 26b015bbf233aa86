//! Radar moment identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RadarError;

/// A measured quantity carried per gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moment {
    Reflectivity,
    Velocity,
    SpectrumWidth,
    DifferentialReflectivity,
    DifferentialPhase,
    CorrelationCoefficient,
    ClutterFilterPower,
}

impl Moment {
    pub const ALL: [Moment; 7] = [
        Moment::Reflectivity,
        Moment::Velocity,
        Moment::SpectrumWidth,
        Moment::DifferentialReflectivity,
        Moment::DifferentialPhase,
        Moment::CorrelationCoefficient,
        Moment::ClutterFilterPower,
    ];

    /// Three-letter data block name used in Message 31 (`REF`, `VEL`, ...).
    pub fn block_name(&self) -> &'static [u8; 3] {
        match self {
            Moment::Reflectivity => b"REF",
            Moment::Velocity => b"VEL",
            Moment::SpectrumWidth => b"SW ",
            Moment::DifferentialReflectivity => b"ZDR",
            Moment::DifferentialPhase => b"PHI",
            Moment::CorrelationCoefficient => b"RHO",
            Moment::ClutterFilterPower => b"CFP",
        }
    }

    /// Look up a moment from its data block name.
    pub fn from_block_name(name: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.block_name().as_slice() == name)
    }

    /// Short product name as used in request paths.
    pub fn product_name(&self) -> &'static str {
        match self {
            Moment::Reflectivity => "ref",
            Moment::Velocity => "vel",
            Moment::SpectrumWidth => "sw",
            Moment::DifferentialReflectivity => "zdr",
            Moment::DifferentialPhase => "phi",
            Moment::CorrelationCoefficient => "rho",
            Moment::ClutterFilterPower => "cfp",
        }
    }
}

impl FromStr for Moment {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.product_name() == lower)
            .ok_or_else(|| RadarError::invalid_parameter("product", format!("Invalid product {:?}", s)))
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_names() {
        assert_eq!("ref".parse::<Moment>().unwrap(), Moment::Reflectivity);
        assert_eq!("VEL".parse::<Moment>().unwrap(), Moment::Velocity);
        assert!("bogus".parse::<Moment>().is_err());
    }

    #[test]
    fn test_block_names() {
        assert_eq!(Moment::from_block_name(b"SW "), Some(Moment::SpectrumWidth));
        assert_eq!(Moment::from_block_name(b"RHO"), Some(Moment::CorrelationCoefficient));
        assert_eq!(Moment::from_block_name(b"XYZ"), None);
    }
}
