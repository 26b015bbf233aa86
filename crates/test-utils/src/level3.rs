//! Level III product test data generator.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::Write;

/// Digital radial data array packet code.
pub const PACKET_RAW: i16 = 16;
/// Run-length radial packet code.
pub const PACKET_RLE: i16 = 0xAF1Fu16 as i16;

/// One radial of a synthetic product. Angles are tenths of a degree.
#[derive(Debug, Clone)]
pub struct SyntheticL3Radial {
    pub angle_start: i16,
    pub angle_delta: i16,
    pub data: Vec<u8>,
}

/// Build a Level III product byte stream.
#[derive(Debug, Clone)]
pub struct Level3Builder {
    code: i16,
    site: String,
    product: String,
    lat: i32,
    lon: i32,
    elevation_tenths: i16,
    description_divider: i16,
    symbology_divider: i16,
    packet_code: i16,
    first_range_bin: i16,
    scale_factor: i16,
    compress: bool,
    leading: Vec<u8>,
    radials: Vec<SyntheticL3Radial>,
}

impl Level3Builder {
    /// A base reflectivity product (code 94) at 0.5 degrees.
    pub fn new(site: &str) -> Self {
        Self {
            code: 94,
            site: site.to_string(),
            product: "N0Q".to_string(),
            lat: 40_865,
            lon: -72_864,
            elevation_tenths: 5,
            description_divider: -1,
            symbology_divider: -1,
            packet_code: PACKET_RAW,
            first_range_bin: 0,
            scale_factor: 0,
            compress: false,
            leading: Vec::new(),
            radials: Vec::new(),
        }
    }

    pub fn code(mut self, code: i16) -> Self {
        self.code = code;
        self
    }

    pub fn product(mut self, product: &str) -> Self {
        self.product = product.to_string();
        self
    }

    pub fn elevation_tenths(mut self, tenths: i16) -> Self {
        self.elevation_tenths = tenths;
        self
    }

    pub fn description_divider(mut self, divider: i16) -> Self {
        self.description_divider = divider;
        self
    }

    pub fn symbology_divider(mut self, divider: i16) -> Self {
        self.symbology_divider = divider;
        self
    }

    pub fn packet_code(mut self, code: i16) -> Self {
        self.packet_code = code;
        self
    }

    pub fn range(mut self, first_range_bin: i16, scale_factor: i16) -> Self {
        self.first_range_bin = first_range_bin;
        self.scale_factor = scale_factor;
        self
    }

    /// bzip2-compress the symbology block.
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    /// Transport bytes placed before the text header.
    pub fn leading_bytes(mut self, bytes: &[u8]) -> Self {
        self.leading = bytes.to_vec();
        self
    }

    pub fn radial(mut self, angle_start: i16, angle_delta: i16, data: Vec<u8>) -> Self {
        self.radials.push(SyntheticL3Radial {
            angle_start,
            angle_delta,
            data,
        });
        self
    }

    /// `count` evenly spaced radials whose bins come from `value(radial, bin)`.
    pub fn sweep<F>(mut self, count: usize, bins: usize, value: F) -> Self
    where
        F: Fn(usize, usize) -> u8,
    {
        let delta = (3600 / count.max(1)) as i16;
        for i in 0..count {
            let data = (0..bins).map(|b| value(i, b)).collect();
            self = self.radial(i as i16 * delta, delta, data);
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.leading.clone();
        out.extend_from_slice(&self.text_header());
        out.extend_from_slice(&self.message_header());
        out.extend_from_slice(&self.product_description());

        let symbology = self.symbology();
        if self.compress {
            let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&symbology).expect("write to Vec");
            out.extend_from_slice(&encoder.finish().expect("finish bzip2 stream"));
        } else {
            out.extend_from_slice(&symbology);
        }
        out
    }

    fn text_header(&self) -> Vec<u8> {
        let mut site = [b' '; 4];
        for (dst, src) in site.iter_mut().zip(self.site.bytes()) {
            *dst = src;
        }
        let mut out = b"SDUS51 ".to_vec();
        out.extend_from_slice(&site);
        out.extend_from_slice(b" 021730\r\r\n");
        let mut product = [b' '; 3];
        for (dst, src) in product.iter_mut().zip(self.product.bytes()) {
            *dst = src;
        }
        out.extend_from_slice(&product);
        out.extend_from_slice(&site[1..]);
        out.extend_from_slice(b"\r\r\n");
        out
    }

    fn message_header(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18);
        out.extend_from_slice(&self.code.to_be_bytes());
        out.extend_from_slice(&18_872i16.to_be_bytes());
        out.extend_from_slice(&62_000i32.to_be_bytes());
        out.extend_from_slice(&0i32.to_be_bytes());
        out.extend_from_slice(&1i16.to_be_bytes());
        out.extend_from_slice(&0i16.to_be_bytes());
        out.extend_from_slice(&3i16.to_be_bytes());
        out
    }

    fn product_description(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(102);
        out.extend_from_slice(&self.description_divider.to_be_bytes());
        out.extend_from_slice(&self.lat.to_be_bytes());
        out.extend_from_slice(&self.lon.to_be_bytes());
        out.extend_from_slice(&20i16.to_be_bytes());
        out.extend_from_slice(&self.code.to_be_bytes());
        out.extend_from_slice(&2i16.to_be_bytes()); // operational mode
        out.extend_from_slice(&212i16.to_be_bytes());
        out.extend_from_slice(&1i16.to_be_bytes());
        out.extend_from_slice(&3i16.to_be_bytes());
        out.extend_from_slice(&18_872i16.to_be_bytes());
        out.extend_from_slice(&62_000i32.to_be_bytes());
        out.extend_from_slice(&18_872i16.to_be_bytes());
        out.extend_from_slice(&62_030i32.to_be_bytes());
        out.extend_from_slice(&0i16.to_be_bytes());
        out.extend_from_slice(&0i16.to_be_bytes());
        out.extend_from_slice(&1i16.to_be_bytes()); // elevation number
        out.extend_from_slice(&self.elevation_tenths.to_be_bytes());
        out.extend_from_slice(&[0u8; 32]);
        out.extend_from_slice(&[0u8; 14]);
        out.push(0); // version
        out.push(0); // spot blank
        out.extend_from_slice(&60i32.to_be_bytes());
        out.extend_from_slice(&0i32.to_be_bytes());
        out.extend_from_slice(&0i32.to_be_bytes());
        out
    }

    fn symbology(&self) -> Vec<u8> {
        let mut packet = Vec::new();
        packet.extend_from_slice(&self.packet_code.to_be_bytes());
        packet.extend_from_slice(&self.first_range_bin.to_be_bytes());
        let bins = self.radials.iter().map(|r| r.data.len()).max().unwrap_or(0);
        packet.extend_from_slice(&(bins as i16).to_be_bytes());
        packet.extend_from_slice(&256i16.to_be_bytes());
        packet.extend_from_slice(&280i16.to_be_bytes());
        packet.extend_from_slice(&self.scale_factor.to_be_bytes());
        packet.extend_from_slice(&(self.radials.len() as i16).to_be_bytes());

        for radial in &self.radials {
            let (length, payload) = if self.packet_code == PACKET_RLE {
                let encoded = encode_run_length(&radial.data);
                ((encoded.len() / 2) as i16, encoded)
            } else {
                (radial.data.len() as i16, radial.data.clone())
            };
            packet.extend_from_slice(&length.to_be_bytes());
            packet.extend_from_slice(&radial.angle_start.to_be_bytes());
            packet.extend_from_slice(&radial.angle_delta.to_be_bytes());
            packet.extend_from_slice(&payload);
        }

        let mut out = Vec::with_capacity(16 + packet.len());
        out.extend_from_slice(&self.symbology_divider.to_be_bytes());
        out.extend_from_slice(&1i16.to_be_bytes());
        out.extend_from_slice(&((16 + packet.len()) as i32).to_be_bytes());
        out.extend_from_slice(&1i16.to_be_bytes());
        out.extend_from_slice(&(-1i16).to_be_bytes());
        out.extend_from_slice(&(packet.len() as i32).to_be_bytes());
        out.extend_from_slice(&packet);
        out
    }
}

/// Nibble run-length encode color indices (< 16), padded to whole halfwords.
pub fn encode_run_length(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut iter = data.iter().peekable();
    while let Some(&color) = iter.next() {
        let mut count = 1u8;
        while count < 15 && iter.peek() == Some(&&color) {
            iter.next();
            count += 1;
        }
        out.push((count << 4) | (color & 0x0F));
    }
    if out.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// Build a gzipped tarball shaped like a Level III daily archive.
///
/// Each `(name, data)` pair becomes a regular file. Names may carry a
/// directory part; the archive readers only look at the base name.
pub fn build_level3_archive(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, *name, data.as_slice())
            .expect("append tar entry");
    }
    let encoder = builder.into_inner().expect("finish tar stream");
    encoder.finish().expect("finish gzip stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_header_is_thirty_bytes() {
        let builder = Level3Builder::new("KOKX");
        assert_eq!(builder.text_header().len(), 30);
        assert_eq!(builder.message_header().len(), 18);
        assert_eq!(builder.product_description().len(), 102);
    }

    #[test]
    fn test_run_length_pads_to_halfword() {
        assert_eq!(encode_run_length(&[3, 3, 3]), vec![0x33, 0x00]);
        assert_eq!(encode_run_length(&[1, 2]), vec![0x11, 0x12]);
    }

    #[test]
    fn test_long_runs_split() {
        let encoded = encode_run_length(&[5; 20]);
        assert_eq!(encoded, vec![0xF5, 0x55]);
    }
}
