//! LDM record framing and message walking.

use bzip2::read::BzDecoder;
use serde::Serialize;
use std::io::Read;

use super::message31::Message31;
use super::vcp::VolumeCoveragePattern;
use crate::cursor::ByteReader;
use crate::error::{DecodeError, DecodeResult};

/// Channel terminal manager prefix that precedes every message.
pub const CTM_HEADER_LEN: usize = 12;
/// Size of the message header that follows the CTM prefix.
pub const MESSAGE_HEADER_LEN: usize = 16;
/// Fixed frame size of every message type other than 31.
pub const LEGACY_FRAME_LEN: usize = 2432;

const MSG_VCP: u8 = 5;
const MSG_DIGITAL_RADAR_DATA: u8 = 31;

/// Header common to every message in a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageHeader {
    /// Message size in halfwords, including this header.
    pub size: u16,
    pub channel: u8,
    pub message_type: u8,
    pub sequence: u16,
    pub julian_date: u16,
    pub milliseconds: u32,
    pub segment_count: u16,
    pub segment_number: u16,
}

impl MessageHeader {
    fn parse(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            size: r.read_u16()?,
            channel: r.read_u8()?,
            message_type: r.read_u8()?,
            sequence: r.read_u16()?,
            julian_date: r.read_u16()?,
            milliseconds: r.read_u32()?,
            segment_count: r.read_u16()?,
            segment_number: r.read_u16()?,
        })
    }
}

/// The decoded content of one LDM record.
#[derive(Debug, Clone)]
pub struct LdmRecord {
    pub radials: Vec<Message31>,
    pub vcp: Option<VolumeCoveragePattern>,
    /// Bytes consumed from the input: control word plus compressed payload.
    pub encoded_len: usize,
}

/// Decode a single LDM record starting at its control word.
///
/// Trailing bytes after the record are ignored, so a ranged read that runs
/// past the record end decodes the same way.
pub fn decode_ldm_record(data: &[u8]) -> DecodeResult<LdmRecord> {
    let mut r = ByteReader::new(data, "LDM control word");
    let control = r.read_i32()?;
    let compressed_len = control.unsigned_abs() as usize;
    if compressed_len == 0 {
        return Err(DecodeError::InvalidRecord(
            "zero-length LDM record".to_string(),
        ));
    }

    r.set_context("LDM record payload");
    let compressed = r.take(compressed_len)?;

    let mut decompressed = Vec::with_capacity(compressed_len * 4);
    BzDecoder::new(compressed)
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::Decompression(format!("LDM record: {}", e)))?;

    let (radials, vcp) = walk_messages(&decompressed)?;

    Ok(LdmRecord {
        radials,
        vcp,
        encoded_len: 4 + compressed_len,
    })
}

fn walk_messages(data: &[u8]) -> DecodeResult<(Vec<Message31>, Option<VolumeCoveragePattern>)> {
    let mut radials = Vec::new();
    let mut vcp = None;
    let mut pos = 0;

    while pos + CTM_HEADER_LEN + MESSAGE_HEADER_LEN <= data.len() {
        let mut r = ByteReader::new(data, "message header");
        r.seek(pos + CTM_HEADER_LEN)?;
        let header = MessageHeader::parse(&mut r)?;
        let body_start = pos + CTM_HEADER_LEN + MESSAGE_HEADER_LEN;

        match header.message_type {
            MSG_DIGITAL_RADAR_DATA => {
                let message_len = header.size as usize * 2;
                if message_len < MESSAGE_HEADER_LEN {
                    return Err(DecodeError::InvalidRecord(format!(
                        "message 31 declares {} bytes",
                        message_len
                    )));
                }
                let body_end = pos + CTM_HEADER_LEN + message_len;
                let body = data.get(body_start..body_end).ok_or(DecodeError::Truncated {
                    context: "message 31 body",
                    offset: body_start,
                    needed: message_len - MESSAGE_HEADER_LEN,
                    available: data.len().saturating_sub(body_start),
                })?;
                radials.push(Message31::parse(body)?);
                pos = body_end;
            }
            MSG_VCP => {
                let frame_end = (pos + LEGACY_FRAME_LEN).min(data.len());
                if vcp.is_none() {
                    vcp = Some(VolumeCoveragePattern::parse(&data[body_start..frame_end])?);
                }
                pos += LEGACY_FRAME_LEN;
            }
            _ => pos += LEGACY_FRAME_LEN,
        }
    }

    Ok((radials, vcp))
}
