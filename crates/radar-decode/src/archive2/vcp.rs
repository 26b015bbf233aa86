//! Message 5: volume coverage pattern.

use serde::Serialize;

use crate::cursor::ByteReader;
use crate::error::DecodeResult;

const HEADER_LEN: usize = 22;
const CUT_LEN: usize = 46;

/// The scan strategy of a volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeCoveragePattern {
    pub pattern_type: u16,
    pub pattern_number: u16,
    pub cuts: Vec<ElevationCut>,
}

/// One elevation cut within a pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationCut {
    /// Degrees.
    pub elevation_angle: f64,
    pub channel_configuration: u8,
    pub waveform_type: u8,
    pub super_resolution: u8,
    pub surveillance_prf_number: u8,
    pub surveillance_prf_pulse_count: u16,
    pub azimuth_rate: u16,
}

/// Convert a coded angle (binary angle, 180/32768 degrees per count) to degrees.
fn coded_angle(raw: u16) -> f64 {
    raw as f64 * 180.0 / 32768.0
}

impl VolumeCoveragePattern {
    pub fn parse(body: &[u8]) -> DecodeResult<Self> {
        let mut r = ByteReader::new(body, "volume coverage pattern");
        r.skip(2)?; // message size
        let pattern_type = r.read_u16()?;
        let pattern_number = r.read_u16()?;
        let cut_count = r.read_u16()? as usize;

        r.seek(HEADER_LEN)?;
        r.set_context("elevation cut");
        // Some frames declare more cuts than they hold; keep only complete ones.
        let available = r.remaining() / CUT_LEN;
        let mut cuts = Vec::with_capacity(cut_count.min(available));
        for i in 0..cut_count.min(available) {
            r.seek(HEADER_LEN + i * CUT_LEN)?;
            cuts.push(ElevationCut {
                elevation_angle: coded_angle(r.read_u16()?),
                channel_configuration: r.read_u8()?,
                waveform_type: r.read_u8()?,
                super_resolution: r.read_u8()?,
                surveillance_prf_number: r.read_u8()?,
                surveillance_prf_pulse_count: r.read_u16()?,
                azimuth_rate: r.read_u16()?,
            });
        }

        Ok(Self {
            pattern_type,
            pattern_number,
            cuts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_angle() {
        assert!((coded_angle(91) - 0.4998).abs() < 1e-3);
        assert!((coded_angle(16384) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_two_cuts() {
        let mut body = vec![0u8; HEADER_LEN + 2 * CUT_LEN];
        body[2..4].copy_from_slice(&2u16.to_be_bytes());
        body[4..6].copy_from_slice(&212u16.to_be_bytes());
        body[6..8].copy_from_slice(&2u16.to_be_bytes());
        body[HEADER_LEN..HEADER_LEN + 2].copy_from_slice(&91u16.to_be_bytes());
        body[HEADER_LEN + 3] = 1;
        body[HEADER_LEN + CUT_LEN..HEADER_LEN + CUT_LEN + 2].copy_from_slice(&273u16.to_be_bytes());

        let vcp = VolumeCoveragePattern::parse(&body).unwrap();
        assert_eq!(vcp.pattern_number, 212);
        assert_eq!(vcp.cuts.len(), 2);
        assert_eq!(vcp.cuts[0].waveform_type, 1);
        assert!((vcp.cuts[1].elevation_angle - 1.4996).abs() < 1e-3);
    }
}
