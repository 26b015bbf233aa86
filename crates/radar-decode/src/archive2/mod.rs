//! Archive II (NEXRAD Level II) volume decoding.
//!
//! A volume file is laid out as:
//!
//! ```text
//! +----------------------+  offset 0
//! | volume header (24 B) |
//! +----------------------+  offset 24 = first LDM record
//! | i32 control word     |  |value| = compressed length
//! | bzip2 stream         |
//! +----------------------+  next LDM record
//! | ...                  |
//! ```
//!
//! Each LDM record decompresses to a run of messages. Every record can be
//! decoded on its own, which is what makes ranged partial fetches possible.

mod message31;
mod record;
mod vcp;

pub use message31::{
    DataMoment, ElevationData, Message31, Message31Header, RadialData, VolumeData,
};
pub use record::{decode_ldm_record, LdmRecord, MessageHeader, CTM_HEADER_LEN, LEGACY_FRAME_LEN};
pub use vcp::{ElevationCut, VolumeCoveragePattern};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cursor::ByteReader;
use crate::error::{DecodeError, DecodeResult};

/// Length of the volume header that precedes the first LDM record.
pub const VOLUME_HEADER_LEN: usize = 24;

/// The 24-byte header at the start of every volume file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeHeader {
    /// Tape filename, e.g. `AR2V0006.`
    pub tape_filename: String,
    pub extension_number: String,
    /// Modified Julian date.
    pub date: u32,
    /// Milliseconds past midnight.
    pub time: u32,
    pub icao: String,
}

impl VolumeHeader {
    pub fn parse(data: &[u8]) -> DecodeResult<Self> {
        if data.len() < VOLUME_HEADER_LEN {
            return Err(DecodeError::InvalidVolumeHeader(format!(
                "need {} bytes, got {}",
                VOLUME_HEADER_LEN,
                data.len()
            )));
        }
        if !data.starts_with(b"AR2V") {
            return Err(DecodeError::InvalidVolumeHeader(
                "missing AR2V magic".to_string(),
            ));
        }

        let mut r = ByteReader::new(data, "volume header");
        Ok(Self {
            tape_filename: r.read_ascii(9)?,
            extension_number: r.read_ascii(3)?,
            date: r.read_u32()?,
            time: r.read_u32()?,
            icao: r.read_ascii(4)?,
        })
    }
}

/// Where one LDM record sits in the source file and which elevations it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    /// Byte offset of the record's control word.
    pub offset: usize,
    /// Total record length including the control word.
    pub length: usize,
    /// Elevation number of every radial in the record, in message order.
    pub elevation_numbers: Vec<u8>,
}

/// A decoded volume: header fields plus radials bucketed by elevation number.
#[derive(Debug, Clone, Serialize)]
pub struct Archive2 {
    pub header: VolumeHeader,
    pub vcp: Option<VolumeCoveragePattern>,
    /// Radials keyed by 1-based elevation number, in merge order.
    #[serde(skip)]
    pub elevation_scans: BTreeMap<u8, Vec<Message31>>,
    /// One entry per LDM record seen by [`Archive2::extract`], in file order.
    pub records: Vec<RecordSummary>,
}

impl Archive2 {
    /// Create an empty volume around an already parsed header.
    pub fn new(header: VolumeHeader) -> Self {
        Self {
            header,
            vcp: None,
            elevation_scans: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    /// Decode a volume header followed by every complete LDM record in `data`.
    ///
    /// `data` may be a prefix of a file that ends on a record boundary, which
    /// is how the header region of a ranged fetch is decoded.
    pub fn extract(data: &[u8]) -> DecodeResult<Self> {
        let header = VolumeHeader::parse(data)?;
        let mut volume = Archive2::new(header);

        let mut offset = VOLUME_HEADER_LEN;
        while offset < data.len() {
            let record = decode_ldm_record(&data[offset..])?;
            let length = record.encoded_len;
            volume.records.push(RecordSummary {
                offset,
                length,
                elevation_numbers: record
                    .radials
                    .iter()
                    .map(|m| m.header.elevation_number)
                    .collect(),
            });
            volume.add_record(record);
            offset += length;
        }

        debug!(
            records = volume.records.len(),
            elevations = volume.elevation_scans.len(),
            "Extracted archive II volume"
        );
        Ok(volume)
    }

    /// Byte offsets of every LDM record, in file order.
    pub fn ldm_offsets(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.offset).collect()
    }

    /// Append a record's radials to the bucket their headers declare.
    pub fn add_record(&mut self, record: LdmRecord) {
        if self.vcp.is_none() {
            self.vcp = record.vcp;
        }
        for radial in record.radials {
            self.elevation_scans
                .entry(radial.header.elevation_number)
                .or_default()
                .push(radial);
        }
    }

    /// Order each elevation's radials by azimuth number.
    pub fn sort_radials(&mut self) {
        for radials in self.elevation_scans.values_mut() {
            radials.sort_by_key(|m| m.header.azimuth_number);
        }
    }

    /// Drop all radial data, keeping header fields.
    pub fn clear_radials(&mut self) {
        self.elevation_scans.clear();
    }

    /// Keep only one elevation's radials.
    pub fn retain_elevation(&mut self, elevation: u8) {
        self.elevation_scans.retain(|&e, _| e == elevation);
    }

    pub fn elevation(&self, elevation: u8) -> Option<&[Message31]> {
        self.elevation_scans.get(&elevation).map(Vec::as_slice)
    }

    pub fn radial_count(&self) -> usize {
        self.elevation_scans.values().map(Vec::len).sum()
    }
}
