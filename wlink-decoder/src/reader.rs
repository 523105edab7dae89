// wlink - wlink-decoder
// Module: Binary Reader
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Cursor over a WebAssembly binary with LEB128 and name decoding.

use wlink_error::{Error, FromError, Result, codes, kinds::UnexpectedEof};

/// Reads primitive values from a byte slice, tracking the offset
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data:     &'a [u8],
    position: usize,
    /// Offset of `data[0]` within the whole module, for error messages
    base:     usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a reader over `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0, base: 0 }
    }

    /// Create a reader over a slice that starts at `base` in the module
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, position: 0, base }
    }

    /// Absolute offset of the cursor
    pub fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Whether all bytes have been consumed
    pub fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Number of bytes left
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    fn eof(&self) -> Error {
        UnexpectedEof { offset: self.offset() }.into()
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.position).ok_or_else(|| self.eof())?;
        self.position += 1;
        Ok(byte)
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(len).ok_or_else(|| self.eof())?;
        let bytes = self.data.get(self.position..end).ok_or_else(|| self.eof())?;
        self.position = end;
        Ok(bytes)
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read an unsigned LEB128 value of at most 32 bits
    pub fn read_u32(&mut self) -> Result<u32> {
        let start = self.offset();
        let mut result = 0u32;
        let mut shift = 0;
        loop {
            let byte = self.read_u8()?;
            if shift == 28 && byte & 0x70 != 0 {
                return Err(too_large(start, "u32"));
            }
            result |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 28 {
                return Err(too_large(start, "u32"));
            }
        }
    }

    /// Read a signed LEB128 value of at most 32 bits
    pub fn read_i32(&mut self) -> Result<i32> {
        let value = self.read_signed(32)?;
        Ok(value as i32)
    }

    /// Read a signed LEB128 value of at most 64 bits
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_signed(64)
    }

    fn read_signed(&mut self, bits: u32) -> Result<i64> {
        let start = self.offset();
        let max_bytes = bits.div_ceil(7);
        let mut result = 0i64;
        let mut shift = 0u32;
        for index in 0..max_bytes {
            let byte = self.read_u8()?;
            if index == max_bytes - 1 {
                // Unused bits of the last byte must be a sign extension.
                let used = bits - shift;
                if used < 7 {
                    let rest = (byte as i8) << 1 >> used;
                    if rest != 0 && rest != -1 {
                        return Err(too_large(start, if bits == 32 { "i32" } else { "i64" }));
                    }
                }
                if byte & 0x80 != 0 {
                    return Err(too_large(start, if bits == 32 { "i32" } else { "i64" }));
                }
            }
            result |= i64::from(byte & 0x7F) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    result |= -1i64 << shift;
                }
                return Ok(result);
            }
        }
        Err(too_large(start, "signed LEB128"))
    }

    /// Read a length-prefixed UTF-8 name
    pub fn read_name(&mut self) -> Result<&'a str> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(Error::from_error)
    }

    /// Read a vector length, guarding against lengths longer than the input
    pub fn read_count(&mut self) -> Result<u32> {
        let count = self.read_u32()?;
        if count as usize > self.remaining() {
            return Err(self.eof());
        }
        Ok(count)
    }

    /// Advance by `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }
}

fn too_large(offset: usize, what: &str) -> Error {
    Error::parse_error(
        codes::INTEGER_TOO_LARGE,
        format!("integer representation too long for {} at offset {}", what, offset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_unsigned_leb128() {
        let mut reader = BinaryReader::new(&[0xE5, 0x8E, 0x26, 0x7F]);
        assert_eq!(reader.read_u32().unwrap(), 624_485);
        assert_eq!(reader.read_u32().unwrap(), 127);
        assert!(reader.is_empty());
    }

    #[test]
    fn rejects_overlong_unsigned() {
        let mut reader = BinaryReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(reader.read_u32().unwrap_err().code, codes::INTEGER_TOO_LARGE);
        let mut reader = BinaryReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(reader.read_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn reads_signed_leb128() {
        assert_eq!(BinaryReader::new(&[0x7F]).read_i32().unwrap(), -1);
        assert_eq!(BinaryReader::new(&[0xC0, 0xBB, 0x78]).read_i32().unwrap(), -123_456);
        assert_eq!(BinaryReader::new(&[0x80, 0x80, 0x80, 0x80, 0x78]).read_i32().unwrap(), i32::MIN);
        assert_eq!(
            BinaryReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00])
                .read_i64()
                .unwrap(),
            i64::MAX
        );
    }

    #[test]
    fn rejects_bad_sign_extension() {
        let mut reader = BinaryReader::new(&[0x80, 0x80, 0x80, 0x80, 0x70]);
        assert!(reader.read_i32().is_err());
    }

    #[test]
    fn eof_reports_offset() {
        let mut reader = BinaryReader::with_base(&[0x80], 10);
        let error = reader.read_u32().unwrap_err();
        assert_eq!(error.code, codes::UNEXPECTED_EOF);
        assert_eq!(error.message(), "unexpected end of input at offset 11");
    }

    #[test]
    fn names_must_be_utf8() {
        let mut reader = BinaryReader::new(&[0x02, 0xFF, 0xFE]);
        assert_eq!(reader.read_name().unwrap_err().code, codes::INVALID_UTF8);
        let mut reader = BinaryReader::new(b"\x03run");
        assert_eq!(reader.read_name().unwrap(), "run");
    }
}
