//! HTTP request handlers for the radar API.

pub mod health;
pub mod level2;
pub mod level3;
pub mod realtime;

use radar_common::RadarError;
use std::str::FromStr;

use crate::error::ApiError;

/// Parse a path segment, reporting failures as an invalid parameter.
pub(crate) fn parse_param<T: FromStr>(name: &str, value: &str) -> Result<T, ApiError> {
    value.parse().map_err(|_| {
        ApiError(RadarError::invalid_parameter(
            name,
            format!("cannot parse {:?}", value),
        ))
    })
}

/// File names of listed objects.
pub(crate) fn file_names(objects: &[storage::ObjectInfo]) -> Vec<String> {
    objects.iter().map(|o| o.file_name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param::<u8>("elevation", "3").unwrap(), 3);
        let err = parse_param::<u8>("elevation", "300").unwrap_err();
        assert!(matches!(err.0, RadarError::InvalidParameter { ref param, .. } if param == "elevation"));
    }
}
