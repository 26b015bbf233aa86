//! Error types for the radar services.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type for radar operations.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Request Errors ===
    #[error("Invalid filename '{name}': {reason}")]
    InvalidFilename { name: String, reason: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Elevation {0} not present in volume")]
    ElevationNotFound(u8),

    #[error("Moment '{moment}' not available for elevation {elevation}")]
    MomentNotAvailable { moment: String, elevation: u8 },

    // === Decode Errors ===
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Corrupt {structure}: divider {value}")]
    CorruptStructure {
        structure: String,
        value: i16,
        /// Headers parsed before the failure, serialized for diagnostics.
        partial: Option<serde_json::Value>,
    },

    #[error("Unsupported product code {code}")]
    UnsupportedProduct {
        code: i16,
        partial: Option<serde_json::Value>,
    },

    #[error("Isosurface construction failed: {0}")]
    Isosurface(String),

    // === Storage Errors ===
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Partial fetch failed: {failed} of {total} chunks unavailable")]
    PartialFetch { failed: usize, total: usize },

    // === Infrastructure Errors ===
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Request timeout")]
    Timeout,
}

impl RadarError {
    /// Shorthand for a `Transport` error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            RadarError::InvalidFilename { .. }
            | RadarError::InvalidParameter { .. }
            | RadarError::UnsupportedProduct { .. } => 400,

            RadarError::ElevationNotFound(_)
            | RadarError::MomentNotAvailable { .. }
            | RadarError::NotFound(_) => 404,

            RadarError::CorruptStructure { .. } | RadarError::Isosurface(_) => 422,

            RadarError::Transport(_) | RadarError::PartialFetch { .. } => 502,
            RadarError::NotConfigured(_) => 503,
            RadarError::Timeout => 504,

            _ => 500,
        }
    }

    /// Partially decoded headers attached to the error, if any.
    pub fn partial(&self) -> Option<&serde_json::Value> {
        match self {
            RadarError::CorruptStructure { partial, .. }
            | RadarError::UnsupportedProduct { partial, .. } => partial.as_ref(),
            _ => None,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        RadarError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for RadarError {
    fn from(err: serde_json::Error) -> Self {
        RadarError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RadarError::InvalidFilename {
                name: "x".into(),
                reason: "short".into()
            }
            .http_status_code(),
            400
        );
        assert_eq!(RadarError::ElevationNotFound(3).http_status_code(), 404);
        assert_eq!(
            RadarError::PartialFetch { failed: 1, total: 4 }.http_status_code(),
            502
        );
        assert_eq!(RadarError::Timeout.http_status_code(), 504);
        assert_eq!(RadarError::Internal("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn test_partial_is_exposed() {
        let err = RadarError::UnsupportedProduct {
            code: 2,
            partial: Some(serde_json::json!({"code": 2})),
        };
        assert_eq!(err.partial().unwrap()["code"], 2);
        assert!(RadarError::Timeout.partial().is_none());
    }

    #[test]
    fn test_partial_fetch_message() {
        let err = RadarError::PartialFetch { failed: 2, total: 5 };
        assert_eq!(
            err.to_string(),
            "Partial fetch failed: 2 of 5 chunks unavailable"
        );
    }
}
