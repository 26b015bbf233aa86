//! Message 31: generic digital radar data, one radial per message.

use radar_common::{Gate, Moment};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cursor::ByteReader;
use crate::error::{DecodeError, DecodeResult};

/// Fixed 32-byte radial header at the start of a Message 31 body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message31Header {
    pub radar_identifier: String,
    /// Milliseconds past midnight, UTC.
    pub collection_time: u32,
    /// Modified Julian date.
    pub collection_date: u16,
    pub azimuth_number: u16,
    /// Degrees clockwise from north.
    pub azimuth_angle: f32,
    pub compression_indicator: u8,
    pub radial_length: u16,
    /// 1 for 0.5 degree spacing, 2 for 1.0 degree.
    pub azimuth_resolution_spacing: u8,
    pub radial_status: u8,
    /// 1-based elevation cut number.
    pub elevation_number: u8,
    pub cut_sector_number: u8,
    pub elevation_angle: f32,
    pub radial_spot_blanking_status: u8,
    pub azimuth_indexing_mode: u8,
    pub data_block_count: u16,
}

impl Message31Header {
    /// Angular width of this radial in degrees.
    pub fn azimuth_resolution(&self) -> f64 {
        if self.azimuth_resolution_spacing == 1 {
            0.5
        } else {
            1.0
        }
    }
}

/// Volume constant block ("RVOL").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeData {
    pub version_major: u8,
    pub version_minor: u8,
    pub lat: f32,
    pub lon: f32,
    /// Site height above sea level, meters.
    pub site_height: i16,
    pub feedhorn_height: u16,
    pub calibration_constant: f32,
    pub horizontal_tx_power: f32,
    pub vertical_tx_power: f32,
    pub zdr_calibration: f32,
    pub initial_system_phi: f32,
    pub volume_coverage_pattern: u16,
    pub processing_status: u16,
}

/// Elevation constant block ("RELV").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationData {
    pub atmospheric_attenuation: i16,
    pub calibration_constant: f32,
}

/// Radial constant block ("RRAD").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialData {
    /// Unambiguous range, kilometers.
    pub unambiguous_range: f32,
    pub horizontal_noise_level: f32,
    pub vertical_noise_level: f32,
    /// Nyquist velocity, m/s.
    pub nyquist_velocity: f32,
}

/// A moment data block such as "DREF" or "DVEL".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataMoment {
    pub gate_count: u16,
    /// Range to the center of the first gate, meters.
    pub first_gate_range: u16,
    /// Gate spacing, meters.
    pub gate_interval: u16,
    pub tover: u16,
    pub snr_threshold: i16,
    pub control_flags: u8,
    /// 8 or 16 bits per gate.
    pub word_size: u8,
    pub scale: f32,
    pub offset: f32,
    #[serde(skip)]
    pub raw: Vec<u16>,
}

impl DataMoment {
    /// Raw value meaning "below threshold".
    pub const BELOW_THRESHOLD: u16 = 0;
    /// Raw value meaning "range folded".
    pub const RANGE_FOLDED: u16 = 1;

    /// Scale raw samples into gates.
    pub fn gates(&self) -> Vec<Gate> {
        self.raw
            .iter()
            .map(|&raw| match raw {
                Self::BELOW_THRESHOLD => Gate::BelowThreshold,
                Self::RANGE_FOLDED => Gate::RangeFolded,
                _ if self.scale == 0.0 => Gate::Value(raw as f32),
                _ => Gate::Value((raw as f32 - self.offset) / self.scale),
            })
            .collect()
    }
}

/// One decoded radial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message31 {
    pub header: Message31Header,
    pub volume: Option<VolumeData>,
    pub elevation: Option<ElevationData>,
    pub radial: Option<RadialData>,
    #[serde(skip)]
    pub moments: BTreeMap<Moment, DataMoment>,
}

impl Message31 {
    pub fn moment(&self, moment: Moment) -> Option<&DataMoment> {
        self.moments.get(&moment)
    }

    /// Decode a Message 31 body (the bytes following the 16-byte message header).
    pub fn parse(body: &[u8]) -> DecodeResult<Self> {
        let mut r = ByteReader::new(body, "message 31 header");

        let radar_identifier = r.read_ascii(4)?;
        let collection_time = r.read_u32()?;
        let collection_date = r.read_u16()?;
        let azimuth_number = r.read_u16()?;
        let azimuth_angle = r.read_f32()?;
        let compression_indicator = r.read_u8()?;
        r.skip(1)?;
        let radial_length = r.read_u16()?;
        let azimuth_resolution_spacing = r.read_u8()?;
        let radial_status = r.read_u8()?;
        let elevation_number = r.read_u8()?;
        let cut_sector_number = r.read_u8()?;
        let elevation_angle = r.read_f32()?;
        let radial_spot_blanking_status = r.read_u8()?;
        let azimuth_indexing_mode = r.read_u8()?;
        let data_block_count = r.read_u16()?;

        let header = Message31Header {
            radar_identifier,
            collection_time,
            collection_date,
            azimuth_number,
            azimuth_angle,
            compression_indicator,
            radial_length,
            azimuth_resolution_spacing,
            radial_status,
            elevation_number,
            cut_sector_number,
            elevation_angle,
            radial_spot_blanking_status,
            azimuth_indexing_mode,
            data_block_count,
        };

        r.set_context("message 31 block pointers");
        let mut pointers = Vec::with_capacity(data_block_count as usize);
        for _ in 0..data_block_count {
            pointers.push(r.read_u32()? as usize);
        }

        let mut message = Message31 {
            header,
            volume: None,
            elevation: None,
            radial: None,
            moments: BTreeMap::new(),
        };

        for pointer in pointers.into_iter().filter(|&p| p != 0) {
            message.parse_block(body, pointer)?;
        }

        Ok(message)
    }

    fn parse_block(&mut self, body: &[u8], pointer: usize) -> DecodeResult<()> {
        let mut r = ByteReader::new(body, "message 31 data block");
        r.seek(pointer)?;
        let block_type = r.read_u8()?;
        let name: [u8; 3] = r.read_array()?;

        match (block_type, &name) {
            (b'R', b"VOL") => {
                r.skip(2)?; // block size
                self.volume = Some(VolumeData {
                    version_major: r.read_u8()?,
                    version_minor: r.read_u8()?,
                    lat: r.read_f32()?,
                    lon: r.read_f32()?,
                    site_height: r.read_i16()?,
                    feedhorn_height: r.read_u16()?,
                    calibration_constant: r.read_f32()?,
                    horizontal_tx_power: r.read_f32()?,
                    vertical_tx_power: r.read_f32()?,
                    zdr_calibration: r.read_f32()?,
                    initial_system_phi: r.read_f32()?,
                    volume_coverage_pattern: r.read_u16()?,
                    processing_status: r.read_u16()?,
                });
            }
            (b'R', b"ELV") => {
                r.skip(2)?;
                self.elevation = Some(ElevationData {
                    atmospheric_attenuation: r.read_i16()?,
                    calibration_constant: r.read_f32()?,
                });
            }
            (b'R', b"RAD") => {
                r.skip(2)?;
                let unambiguous_range = r.read_i16()? as f32 / 10.0;
                let horizontal_noise_level = r.read_f32()?;
                let vertical_noise_level = r.read_f32()?;
                let nyquist_velocity = r.read_u16()? as f32 / 100.0;
                self.radial = Some(RadialData {
                    unambiguous_range,
                    horizontal_noise_level,
                    vertical_noise_level,
                    nyquist_velocity,
                });
            }
            (b'D', name) => {
                // Unknown moments are skipped.
                if let Some(moment) = Moment::from_block_name(name) {
                    self.moments.insert(moment, parse_moment(&mut r)?);
                }
            }
            _ => {}
        }

        Ok(())
    }
}

fn parse_moment(r: &mut ByteReader<'_>) -> DecodeResult<DataMoment> {
    r.skip(4)?; // reserved
    let gate_count = r.read_u16()?;
    let first_gate_range = r.read_u16()?;
    let gate_interval = r.read_u16()?;
    let tover = r.read_u16()?;
    let snr_threshold = r.read_i16()?;
    let control_flags = r.read_u8()?;
    let word_size = r.read_u8()?;
    let scale = r.read_f32()?;
    let offset = r.read_f32()?;

    r.set_context("moment data");
    let raw = match word_size {
        8 => r.take(gate_count as usize)?.iter().map(|&b| b as u16).collect(),
        16 => {
            let bytes = r.take(gate_count as usize * 2)?;
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect()
        }
        other => {
            return Err(DecodeError::InvalidRecord(format!(
                "unsupported moment word size {}",
                other
            )))
        }
    };

    Ok(DataMoment {
        gate_count,
        first_gate_range,
        gate_interval,
        tover,
        snr_threshold,
        control_flags,
        word_size,
        scale,
        offset,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moment(raw: Vec<u16>) -> DataMoment {
        DataMoment {
            gate_count: raw.len() as u16,
            first_gate_range: 2125,
            gate_interval: 250,
            tover: 0,
            snr_threshold: 0,
            control_flags: 0,
            word_size: 8,
            scale: 2.0,
            offset: 66.0,
            raw,
        }
    }

    #[test]
    fn test_moment_scaling() {
        let gates = moment(vec![0, 1, 66, 86]).gates();
        assert_eq!(gates[0], Gate::BelowThreshold);
        assert_eq!(gates[1], Gate::RangeFolded);
        assert_eq!(gates[2], Gate::Value(0.0));
        assert_eq!(gates[3], Gate::Value(10.0));
    }

    #[test]
    fn test_zero_scale_passes_raw_through() {
        let mut m = moment(vec![5]);
        m.scale = 0.0;
        assert_eq!(m.gates(), vec![Gate::Value(5.0)]);
    }

    #[test]
    fn test_short_body_is_truncated() {
        let err = Message31::parse(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }
}
