//! NEXRAD Level III product decoding.
//!
//! Field layouts follow the RPG-to-class-1-user ICD (2620001). A product is:
//! text header, message header, product description block, then a symbology
//! block holding one radial packet. The symbology block may be bzip2
//! compressed, in which case it starts with the `BZ` magic.

mod rle;

pub use rle::decode_run_length;

use bzip2::read::BzDecoder;
use serde::Serialize;
use std::io::Read;
use tracing::{info, trace};

use crate::cursor::ByteReader;
use crate::error::{DecodeError, DecodeResult};

/// Products this decoder knows how to read.
pub const SUPPORTED_PRODUCTS: [i16; 32] = [
    19, 20, 25, 27, 28, 30, 32, 34, 56, 78, 79, 80, 94, 99, 134, 135, 138, 159, 161, 163, 165,
    169, 170, 171, 172, 173, 174, 175, 177, 181, 182, 186,
];

/// Digital radial data array packet: one byte per bin.
pub const PACKET_RAW: i16 = 16;
/// Radial data packet: nibble run-length encoded (0xAF1F).
pub const PACKET_RLE: i16 = 0xAF1Fu16 as i16;

const TEXT_HEADER_MARKER: &[u8] = b"SDUS";
const DIVIDER: i16 = -1;

pub fn is_supported_product(code: i16) -> bool {
    SUPPORTED_PRODUCTS.contains(&code)
}

/// WMO text header (30 bytes).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextHeader {
    pub file_type: String,
    pub radar_identifier: String,
    /// Day, hour and minute of issue (`DDHHMM`).
    pub ddhhmm: String,
    pub product: String,
    pub radar_identifier3: String,
}

impl TextHeader {
    fn parse(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.set_context("text header");
        let file_type = r.read_ascii(6)?;
        r.skip(1)?;
        let radar_identifier = r.read_ascii(4)?;
        r.skip(1)?;
        let ddhhmm = r.read_ascii(6)?;
        r.skip(3)?;
        let product = r.read_ascii(3)?;
        let radar_identifier3 = r.read_ascii(3)?;
        r.skip(3)?;
        Ok(Self {
            file_type,
            radar_identifier,
            ddhhmm,
            product,
            radar_identifier3,
        })
    }
}

/// Message header block (18 bytes).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageHeader {
    pub code: i16,
    pub date: i16,
    pub time: i32,
    pub length: i32,
    pub source_id: i16,
    pub dest_id: i16,
    pub block_count: i16,
}

impl MessageHeader {
    fn parse(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.set_context("message header");
        Ok(Self {
            code: r.read_i16()?,
            date: r.read_i16()?,
            time: r.read_i32()?,
            length: r.read_i32()?,
            source_id: r.read_i16()?,
            dest_id: r.read_i16()?,
            block_count: r.read_i16()?,
        })
    }
}

/// Product description block (102 bytes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDescription {
    pub divider: i16,
    /// Site latitude, thousandths of a degree.
    pub lat: i32,
    /// Site longitude, thousandths of a degree.
    pub lon: i32,
    pub height: i16,
    pub code: i16,
    pub operational_mode: i16,
    pub volume_coverage_pattern: i16,
    pub sequence_number: i16,
    pub volume_scan_number: i16,
    pub volume_scan_date: i16,
    pub volume_scan_time: i32,
    pub generation_date: i16,
    pub generation_time: i32,
    pub product_dependent_27: i16,
    pub product_dependent_28: i16,
    pub elevation_number: i16,
    /// Elevation angle in tenths of a degree for elevation-based products.
    pub product_dependent_30: i16,
    #[serde(skip)]
    pub data_thresholds: [u8; 32],
    pub product_dependent_47_53: [i16; 7],
    pub version: i8,
    pub spot_blank: bool,
    pub symbology_offset: i32,
    pub graphic_offset: i32,
    pub tabular_offset: i32,
}

impl ProductDescription {
    fn parse(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.set_context("product description");
        let divider = r.read_i16()?;
        let lat = r.read_i32()?;
        let lon = r.read_i32()?;
        let height = r.read_i16()?;
        let code = r.read_i16()?;
        let operational_mode = r.read_i16()?;
        let volume_coverage_pattern = r.read_i16()?;
        let sequence_number = r.read_i16()?;
        let volume_scan_number = r.read_i16()?;
        let volume_scan_date = r.read_i16()?;
        let volume_scan_time = r.read_i32()?;
        let generation_date = r.read_i16()?;
        let generation_time = r.read_i32()?;
        let product_dependent_27 = r.read_i16()?;
        let product_dependent_28 = r.read_i16()?;
        let elevation_number = r.read_i16()?;
        let product_dependent_30 = r.read_i16()?;
        let data_thresholds = r.read_array()?;
        let mut product_dependent_47_53 = [0i16; 7];
        for value in product_dependent_47_53.iter_mut() {
            *value = r.read_i16()?;
        }
        let version = r.read_i8()?;
        let spot_blank = r.read_u8()? != 0;
        let symbology_offset = r.read_i32()?;
        let graphic_offset = r.read_i32()?;
        let tabular_offset = r.read_i32()?;

        Ok(Self {
            divider,
            lat,
            lon,
            height,
            code,
            operational_mode,
            volume_coverage_pattern,
            sequence_number,
            volume_scan_number,
            volume_scan_date,
            volume_scan_time,
            generation_date,
            generation_time,
            product_dependent_27,
            product_dependent_28,
            elevation_number,
            product_dependent_30,
            data_thresholds,
            product_dependent_47_53,
            version,
            spot_blank,
            symbology_offset,
            graphic_offset,
            tabular_offset,
        })
    }
}

/// Product symbology block header (16 bytes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbologyBlock {
    pub divider: i16,
    pub block_id: i16,
    pub length: i32,
    pub layer_count: i16,
    pub layer_divider: i16,
    pub layer_length: i32,
}

impl SymbologyBlock {
    fn parse(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.set_context("symbology block");
        Ok(Self {
            divider: r.read_i16()?,
            block_id: r.read_i16()?,
            length: r.read_i32()?,
            layer_count: r.read_i16()?,
            layer_divider: r.read_i16()?,
            layer_length: r.read_i32()?,
        })
    }
}

/// Radial packet header (14 bytes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialPacketHeader {
    pub code: i16,
    pub first_range_bin: i16,
    pub bin_count: i16,
    pub i_center: i16,
    pub j_center: i16,
    pub scale_factor: i16,
    pub radial_count: i16,
}

impl RadialPacketHeader {
    fn parse(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.set_context("radial packet header");
        Ok(Self {
            code: r.read_i16()?,
            first_range_bin: r.read_i16()?,
            bin_count: r.read_i16()?,
            i_center: r.read_i16()?,
            j_center: r.read_i16()?,
            scale_factor: r.read_i16()?,
            radial_count: r.read_i16()?,
        })
    }
}

/// Per-radial header (6 bytes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialHeader {
    /// Bytes (raw packets) or halfwords (run-length packets) of payload.
    pub length: i16,
    /// Start angle, tenths of a degree.
    pub angle_start: i16,
    /// Angular width, tenths of a degree.
    pub angle_delta: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level3Radial {
    pub header: RadialHeader,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// How far radial decoding got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RadialDecodeStatus {
    #[default]
    Complete,
    /// The packet code was not recognized; radials stop at that point.
    UnknownPacketEncoding(i16),
}

/// A decoded Level III product.
///
/// Fields after `message_header` are `None` when decoding stopped before
/// reaching them (see [`DecodeError::partial`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Level3Product {
    pub text_header: TextHeader,
    pub message_header: MessageHeader,
    pub product_description: Option<ProductDescription>,
    pub symbology: Option<SymbologyBlock>,
    pub radial_packet_header: Option<RadialPacketHeader>,
    pub radials: Vec<Level3Radial>,
    pub radial_status: RadialDecodeStatus,
    /// Whether the symbology block was bzip2 compressed.
    pub compressed: bool,
}

impl Level3Product {
    /// Decode a product. Leading transport bytes before `SDUS` are skipped.
    pub fn decode(data: &[u8]) -> DecodeResult<Self> {
        let start = find_marker(data, TEXT_HEADER_MARKER).ok_or(DecodeError::MissingTextHeader)?;
        let mut r = ByteReader::new(&data[start..], "text header");

        let mut product = Level3Product {
            text_header: TextHeader::parse(&mut r)?,
            message_header: MessageHeader::parse(&mut r)?,
            ..Default::default()
        };

        let code = product.message_header.code;
        if !is_supported_product(code) {
            return Err(DecodeError::UnsupportedProduct {
                code,
                partial: Box::new(product),
            });
        }

        let description = ProductDescription::parse(&mut r)?;
        let divider = description.divider;
        product.product_description = Some(description);
        if divider != DIVIDER {
            return Err(DecodeError::CorruptStructure {
                structure: "product description",
                value: divider,
                partial: Box::new(product),
            });
        }

        let decompressed;
        let mut sym = if r.peek(2) == Some(b"BZ") {
            trace!("Found bzip2 symbology block");
            let mut out = Vec::new();
            BzDecoder::new(r.rest())
                .read_to_end(&mut out)
                .map_err(|e| DecodeError::Decompression(format!("symbology block: {}", e)))?;
            decompressed = out;
            product.compressed = true;
            ByteReader::new(&decompressed, "symbology block")
        } else {
            r
        };

        let symbology = SymbologyBlock::parse(&mut sym)?;
        let divider = symbology.divider;
        product.symbology = Some(symbology);
        if divider != DIVIDER {
            return Err(DecodeError::CorruptStructure {
                structure: "symbology block",
                value: divider,
                partial: Box::new(product),
            });
        }

        let packet = RadialPacketHeader::parse(&mut sym)?;
        let packet_code = packet.code;
        let radial_count = packet.radial_count.max(0) as usize;
        product.radial_packet_header = Some(packet);

        sym.set_context("radial");
        for _ in 0..radial_count {
            let header = RadialHeader {
                length: sym.read_i16()?,
                angle_start: sym.read_i16()?,
                angle_delta: sym.read_i16()?,
            };
            let length = header.length.max(0) as usize;

            let data = match packet_code {
                PACKET_RAW => sym.take(length)?.to_vec(),
                PACKET_RLE => decode_run_length(sym.take(length * 2)?),
                other => {
                    info!(code = other, "Unknown radial packet code");
                    product.radial_status = RadialDecodeStatus::UnknownPacketEncoding(other);
                    break;
                }
            };

            product.radials.push(Level3Radial { header, data });
        }

        Ok(product)
    }

    pub fn product_code(&self) -> i16 {
        self.message_header.code
    }
}

fn find_marker(data: &[u8], marker: &[u8]) -> Option<usize> {
    data.windows(marker.len()).position(|w| w == marker)
}
