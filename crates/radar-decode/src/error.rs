//! Error types for radar decoding.

use radar_common::RadarError;
use thiserror::Error;

use crate::level3::Level3Product;

/// Result type alias for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding radar data.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Input ended before a fixed-size record was complete.
    #[error("truncated {context}: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The Archive II volume header is malformed.
    #[error("invalid volume header: {0}")]
    InvalidVolumeHeader(String),

    /// An LDM record or message inside it is malformed.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// bzip2 decompression failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// No `SDUS` text header was found in a Level III product.
    #[error("cannot find Level III text header")]
    MissingTextHeader,

    /// A divider field did not hold -1. Carries whatever was parsed first.
    #[error("corrupt {structure} divider {value}")]
    CorruptStructure {
        structure: &'static str,
        value: i16,
        partial: Box<Level3Product>,
    },

    /// The product code is not in the supported table. Header fields stay usable.
    #[error("unsupported product code {code}")]
    UnsupportedProduct {
        code: i16,
        partial: Box<Level3Product>,
    },

    /// The requested moment is absent from every radial of a sweep.
    #[error("moment {moment} not present in elevation {elevation}")]
    MomentNotAvailable { moment: String, elevation: u8 },

    /// A sweep contained no radials.
    #[error("elevation {0} has no radials")]
    EmptyElevation(u8),
}

impl DecodeError {
    /// The partially decoded product carried by the error, if any.
    pub fn partial(&self) -> Option<&Level3Product> {
        match self {
            DecodeError::CorruptStructure { partial, .. }
            | DecodeError::UnsupportedProduct { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

impl From<DecodeError> for RadarError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::CorruptStructure {
                structure,
                value,
                partial,
            } => RadarError::CorruptStructure {
                structure: structure.to_string(),
                value,
                partial: serde_json::to_value(&*partial).ok(),
            },
            DecodeError::UnsupportedProduct { code, partial } => RadarError::UnsupportedProduct {
                code,
                partial: serde_json::to_value(&*partial).ok(),
            },
            DecodeError::MomentNotAvailable { moment, elevation } => {
                RadarError::MomentNotAvailable { moment, elevation }
            }
            DecodeError::EmptyElevation(elevation) => RadarError::ElevationNotFound(elevation),
            other => RadarError::Decode(other.to_string()),
        }
    }
}
