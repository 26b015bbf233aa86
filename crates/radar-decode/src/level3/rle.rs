//! Nibble run-length decoding for radial packet `0xAF1F`.

/// Expand run-length encoded bytes.
///
/// Each byte holds a run count in its high nibble and a color index in its
/// low nibble, and expands to `count` copies of `index`.
pub fn decode_run_length(encoded: &[u8]) -> Vec<u8> {
    let total: usize = encoded.iter().map(|b| (b >> 4) as usize).sum();
    let mut out = Vec::with_capacity(total);
    for &byte in encoded {
        let runs = byte >> 4;
        let color = byte & 0x0F;
        out.extend(std::iter::repeat(color).take(runs as usize));
    }
    out
}
