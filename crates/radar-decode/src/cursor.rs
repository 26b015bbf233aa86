//! Bounds-checked big-endian byte reader.

use crate::error::{DecodeError, DecodeResult};

/// Reads fixed-width big-endian fields from a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> ByteReader<'a> {
    /// `context` names the structure being read, for error messages.
    pub fn new(data: &'a [u8], context: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            context,
        }
    }

    /// Change the structure name reported by later errors.
    pub fn set_context(&mut self, context: &'static str) {
        self.context = context;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The unread tail of the input.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    pub fn seek(&mut self, pos: usize) -> DecodeResult<()> {
        if pos > self.data.len() {
            return Err(self.truncated(pos.saturating_sub(self.pos)));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> DecodeResult<()> {
        self.take(n).map(|_| ())
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Option<&'a [u8]> {
        self.data.get(self.pos..self.pos + n)
    }

    pub fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(|| self.truncated(n))?;
        let slice = self.data.get(self.pos..end).ok_or_else(|| self.truncated(n))?;
        self.pos = end;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> DecodeResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> DecodeResult<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Read `n` bytes as ASCII text, trimming NULs and whitespace.
    pub fn read_ascii(&mut self, n: usize) -> DecodeResult<String> {
        let raw = self.take(n)?;
        Ok(String::from_utf8_lossy(raw)
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string())
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            context: self.context,
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let data = [0x00, 0x01, 0xFF, 0xFF, 0x00, 0x00, 0x03, 0xE8, 0x3F, 0x80, 0x00, 0x00];
        let mut r = ByteReader::new(&data, "test");
        assert_eq!(r.read_u16().unwrap(), 1);
        assert_eq!(r.read_i16().unwrap(), -1);
        assert_eq!(r.read_u32().unwrap(), 1000);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_reports_context() {
        let data = [0x01, 0x02, 0x03];
        let mut r = ByteReader::new(&data, "message header");
        r.read_u16().unwrap();
        match r.read_u32() {
            Err(DecodeError::Truncated {
                context,
                offset,
                needed,
                available,
            }) => {
                assert_eq!(context, "message header");
                assert_eq!(offset, 2);
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        // A failed read does not advance the cursor.
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn test_peek_and_ascii() {
        let data = b"BZh9 KOKX\0\0";
        let mut r = ByteReader::new(data, "test");
        assert_eq!(r.peek(2), Some(&b"BZ"[..]));
        assert_eq!(r.position(), 0);
        r.skip(4).unwrap();
        assert_eq!(r.read_ascii(7).unwrap(), "KOKX");
    }
}
