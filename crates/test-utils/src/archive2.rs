//! Archive II test data generator.
//!
//! Creates small synthetic Level II volumes for testing the decoder, the
//! chunk index and the partial-fetch path. The generated files follow the
//! real layout (volume header, bzip2 LDM records, CTM-prefixed messages) but
//! hold only a handful of radials.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::Write;

const CTM_LEN: usize = 12;
const FRAME_LEN: usize = 2432;

/// One moment data block on a synthetic radial.
#[derive(Debug, Clone)]
pub struct SyntheticMoment {
    pub name: [u8; 3],
    pub first_gate: u16,
    pub gate_interval: u16,
    pub scale: f32,
    pub offset: f32,
    pub raw: Vec<u8>,
}

impl SyntheticMoment {
    /// Reflectivity with the operational scaling (dBZ = (raw - 66) / 2).
    pub fn reflectivity(raw: Vec<u8>) -> Self {
        Self {
            name: *b"REF",
            first_gate: 2125,
            gate_interval: 250,
            scale: 2.0,
            offset: 66.0,
            raw,
        }
    }

    /// Velocity with the operational scaling (m/s = (raw - 129) / 2).
    pub fn velocity(raw: Vec<u8>) -> Self {
        Self {
            name: *b"VEL",
            first_gate: 2125,
            gate_interval: 250,
            scale: 2.0,
            offset: 129.0,
            raw,
        }
    }

    /// Physical value a raw sample decodes to.
    pub fn scaled(&self, raw: u8) -> f32 {
        (raw as f32 - self.offset) / self.scale
    }
}

/// One synthetic Message 31 radial.
#[derive(Debug, Clone)]
pub struct SyntheticRadial {
    pub elevation_number: u8,
    pub elevation_angle: f32,
    pub azimuth_number: u16,
    pub azimuth_angle: f32,
    /// 1 for 0.5 degree radials, 2 for 1.0 degree.
    pub azimuth_spacing: u8,
    pub lat: f32,
    pub lon: f32,
    pub moments: Vec<SyntheticMoment>,
}

/// Build a minimal Archive II volume.
#[derive(Debug, Clone)]
pub struct Archive2Builder {
    icao: String,
    date: u32,
    time: u32,
    vcp: Option<(u16, Vec<f32>)>,
    records: Vec<Vec<SyntheticRadial>>,
}

impl Archive2Builder {
    pub fn new(icao: &str) -> Self {
        Self {
            icao: icao.to_string(),
            date: 18_872, // 2021-09-02
            time: 268_000,
            vcp: None,
            records: Vec::new(),
        }
    }

    /// Add a leading metadata record holding a Message 5 with these cut angles.
    pub fn with_metadata_record(mut self, pattern_number: u16, cut_angles: &[f32]) -> Self {
        self.vcp = Some((pattern_number, cut_angles.to_vec()));
        self
    }

    /// Append one LDM record holding these radials.
    pub fn record(mut self, radials: Vec<SyntheticRadial>) -> Self {
        self.records.push(radials);
        self
    }

    /// Split radials into records of at most `per_record` radials each.
    pub fn records_of(mut self, radials: Vec<SyntheticRadial>, per_record: usize) -> Self {
        for chunk in radials.chunks(per_record.max(1)) {
            self.records.push(chunk.to_vec());
        }
        self
    }

    /// Three elevations of eight 1-degree radials with twelve gates each,
    /// packed five radials per record so records straddle elevations.
    ///
    /// Elevation 1 carries only reflectivity; elevations 2 and 3 also carry
    /// velocity. Reflectivity samples follow [`standard_ref_raw`].
    pub fn standard(icao: &str) -> Self {
        let angles = [0.5f32, 1.5, 2.4];
        let mut radials = Vec::new();
        for (i, angle) in angles.iter().enumerate() {
            let elevation = i as u8 + 1;
            radials.extend(sweep(elevation, *angle, 8, 2, 12, |az, gate| {
                let mut moments = vec![SyntheticMoment::reflectivity(
                    (0..gate).map(|g| standard_ref_raw(elevation, az, g)).collect(),
                )];
                if elevation > 1 {
                    moments.push(SyntheticMoment::velocity(vec![129; gate]));
                }
                moments
            }));
        }

        Self::new(icao)
            .with_metadata_record(212, &angles)
            .records_of(radials, 5)
    }

    /// Encode the whole volume file.
    pub fn build(&self) -> Vec<u8> {
        self.build_with_offsets().0
    }

    /// Encode the volume and report the byte offset of every LDM record.
    pub fn build_with_offsets(&self) -> (Vec<u8>, Vec<usize>) {
        let mut data = self.volume_header();
        let mut offsets = Vec::new();
        for record in self.encoded_records() {
            offsets.push(data.len());
            data.extend_from_slice(&record);
        }
        (data, offsets)
    }

    /// Encode the volume the way the real-time chunks bucket stores it:
    /// the first object is the volume header plus the first record, every
    /// later object is exactly one record.
    pub fn build_realtime_chunks(&self) -> Vec<Vec<u8>> {
        let mut records = self.encoded_records().into_iter();
        let mut first = self.volume_header();
        if let Some(record) = records.next() {
            first.extend_from_slice(&record);
        }
        std::iter::once(first).chain(records).collect()
    }

    fn volume_header(&self) -> Vec<u8> {
        let mut out = b"AR2V0006.001".to_vec();
        out.extend_from_slice(&self.date.to_be_bytes());
        out.extend_from_slice(&self.time.to_be_bytes());
        let mut icao = [b' '; 4];
        for (dst, src) in icao.iter_mut().zip(self.icao.bytes()) {
            *dst = src;
        }
        out.extend_from_slice(&icao);
        out
    }

    fn encoded_records(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        if let Some((pattern, angles)) = &self.vcp {
            let mut messages = message5_frame(*pattern, angles);
            messages.extend_from_slice(&status_frame());
            out.push(encode_ldm_record(&messages));
        }
        for radials in &self.records {
            let mut messages = Vec::new();
            for radial in radials {
                messages.extend_from_slice(&message31(&self.icao, radial));
            }
            out.push(encode_ldm_record(&messages));
        }
        out
    }
}

/// Reflectivity raw value used by [`Archive2Builder::standard`]. Always >= 2,
/// so every gate decodes to a value.
pub fn standard_ref_raw(elevation: u8, azimuth: usize, gate: usize) -> u8 {
    2 + ((elevation as usize * 31 + azimuth * 7 + gate * 3) % 200) as u8
}

/// Generate one sweep of evenly spaced radials.
///
/// `moments(azimuth_index, gate_count)` supplies each radial's data blocks.
pub fn sweep<F>(
    elevation_number: u8,
    elevation_angle: f32,
    radial_count: usize,
    azimuth_spacing: u8,
    gate_count: usize,
    moments: F,
) -> Vec<SyntheticRadial>
where
    F: Fn(usize, usize) -> Vec<SyntheticMoment>,
{
    let step = 360.0 / radial_count.max(1) as f32;
    (0..radial_count)
        .map(|az| SyntheticRadial {
            elevation_number,
            elevation_angle,
            azimuth_number: az as u16 + 1,
            azimuth_angle: az as f32 * step,
            azimuth_spacing,
            lat: 40.865,
            lon: -72.864,
            moments: moments(az, gate_count),
        })
        .collect()
}

/// Wrap message bytes into a control word plus bzip2 stream.
pub fn encode_ldm_record(messages: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(messages).expect("write to Vec");
    let compressed = encoder.finish().expect("finish bzip2 stream");

    let mut out = Vec::with_capacity(compressed.len() + 4);
    // Real files use a negative control word on the last record; decoders take |n|.
    out.extend_from_slice(&(compressed.len() as i32).to_be_bytes());
    out.extend_from_slice(&compressed);
    out
}

fn message_header(message_type: u8, size_halfwords: u16) -> Vec<u8> {
    let mut out = vec![0u8; CTM_LEN];
    out.extend_from_slice(&size_halfwords.to_be_bytes());
    out.push(0); // channel
    out.push(message_type);
    out.extend_from_slice(&1u16.to_be_bytes()); // sequence
    out.extend_from_slice(&18_872u16.to_be_bytes());
    out.extend_from_slice(&268_000u32.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out
}

fn message5_frame(pattern_number: u16, angles: &[f32]) -> Vec<u8> {
    let mut body = Vec::new();
    let size = (22 + angles.len() * 46) / 2;
    body.extend_from_slice(&(size as u16).to_be_bytes());
    body.extend_from_slice(&2u16.to_be_bytes()); // pattern type
    body.extend_from_slice(&pattern_number.to_be_bytes());
    body.extend_from_slice(&(angles.len() as u16).to_be_bytes());
    body.resize(22, 0);
    for angle in angles {
        let mut cut = vec![0u8; 46];
        let coded = (angle * 32768.0 / 180.0).round() as u16;
        cut[0..2].copy_from_slice(&coded.to_be_bytes());
        cut[2] = 1; // channel configuration
        cut[3] = 1; // waveform: contiguous surveillance
        cut[4] = 11; // super resolution flags
        cut[5] = 1;
        cut[6..8].copy_from_slice(&28u16.to_be_bytes());
        cut[8..10].copy_from_slice(&11_000u16.to_be_bytes());
        body.extend_from_slice(&cut);
    }

    let mut frame = message_header(5, ((16 + body.len()) / 2) as u16);
    frame.extend_from_slice(&body);
    frame.resize(FRAME_LEN, 0);
    frame
}

fn status_frame() -> Vec<u8> {
    let mut frame = message_header(2, 30);
    frame.resize(FRAME_LEN, 0);
    frame
}

fn message31(icao: &str, radial: &SyntheticRadial) -> Vec<u8> {
    let mut blocks: Vec<Vec<u8>> = Vec::new();

    let mut vol = b"RVOL".to_vec();
    vol.extend_from_slice(&44u16.to_be_bytes());
    vol.push(1);
    vol.push(0);
    vol.extend_from_slice(&radial.lat.to_be_bytes());
    vol.extend_from_slice(&radial.lon.to_be_bytes());
    vol.extend_from_slice(&20i16.to_be_bytes());
    vol.extend_from_slice(&20u16.to_be_bytes());
    for value in [-44.0f32, 700.0, 700.0, 0.2, 60.0] {
        vol.extend_from_slice(&value.to_be_bytes());
    }
    vol.extend_from_slice(&212u16.to_be_bytes());
    vol.extend_from_slice(&0u16.to_be_bytes());
    blocks.push(vol);

    let mut elv = b"RELV".to_vec();
    elv.extend_from_slice(&12u16.to_be_bytes());
    elv.extend_from_slice(&(-12i16).to_be_bytes());
    elv.extend_from_slice(&(-44.5f32).to_be_bytes());
    blocks.push(elv);

    let mut rad = b"RRAD".to_vec();
    rad.extend_from_slice(&20u16.to_be_bytes());
    rad.extend_from_slice(&4660i16.to_be_bytes());
    rad.extend_from_slice(&(-80.0f32).to_be_bytes());
    rad.extend_from_slice(&(-80.5f32).to_be_bytes());
    rad.extend_from_slice(&2_650u16.to_be_bytes());
    rad.extend_from_slice(&0u16.to_be_bytes());
    blocks.push(rad);

    for moment in &radial.moments {
        let mut block = vec![b'D'];
        block.extend_from_slice(&moment.name);
        block.extend_from_slice(&0u32.to_be_bytes());
        block.extend_from_slice(&(moment.raw.len() as u16).to_be_bytes());
        block.extend_from_slice(&moment.first_gate.to_be_bytes());
        block.extend_from_slice(&moment.gate_interval.to_be_bytes());
        block.extend_from_slice(&16u16.to_be_bytes());
        block.extend_from_slice(&28i16.to_be_bytes());
        block.push(0);
        block.push(8);
        block.extend_from_slice(&moment.scale.to_be_bytes());
        block.extend_from_slice(&moment.offset.to_be_bytes());
        block.extend_from_slice(&moment.raw);
        blocks.push(block);
    }

    let header_len = 32 + 4 * blocks.len();
    let mut pointers = Vec::with_capacity(blocks.len());
    let mut cursor = header_len;
    for block in &blocks {
        pointers.push(cursor as u32);
        cursor += block.len();
    }

    let mut body = Vec::with_capacity(cursor + 1);
    let mut id = [b' '; 4];
    for (dst, src) in id.iter_mut().zip(icao.bytes()) {
        *dst = src;
    }
    body.extend_from_slice(&id);
    body.extend_from_slice(&268_000u32.to_be_bytes());
    body.extend_from_slice(&18_872u16.to_be_bytes());
    body.extend_from_slice(&radial.azimuth_number.to_be_bytes());
    body.extend_from_slice(&radial.azimuth_angle.to_be_bytes());
    body.push(0); // compression
    body.push(0);
    body.extend_from_slice(&(cursor as u16).to_be_bytes());
    body.push(radial.azimuth_spacing);
    body.push(1); // radial status
    body.push(radial.elevation_number);
    body.push(1); // cut sector
    body.extend_from_slice(&radial.elevation_angle.to_be_bytes());
    body.push(0);
    body.push(0);
    body.extend_from_slice(&(blocks.len() as u16).to_be_bytes());
    for pointer in pointers {
        body.extend_from_slice(&pointer.to_be_bytes());
    }
    for block in blocks {
        body.extend_from_slice(&block);
    }
    if body.len() % 2 == 1 {
        body.push(0);
    }

    let mut message = message_header(31, ((16 + body.len()) / 2) as u16);
    message.extend_from_slice(&body);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_follow_header() {
        let (data, offsets) = Archive2Builder::standard("KOKX").build_with_offsets();
        assert_eq!(offsets[0], 24);
        assert_eq!(offsets.len(), 6);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert!(*offsets.last().unwrap() < data.len());
        assert_eq!(&data[..4], b"AR2V");
    }

    #[test]
    fn test_realtime_chunks_match_file() {
        let builder = Archive2Builder::standard("KOKX");
        let chunks = builder.build_realtime_chunks();
        assert_eq!(chunks.len(), 6);
        assert_eq!(chunks.concat(), builder.build());
    }

    #[test]
    fn test_standard_raw_values_are_measurements() {
        for az in 0..8 {
            for gate in 0..12 {
                assert!(standard_ref_raw(3, az, gate) >= 2);
            }
        }
    }
}
