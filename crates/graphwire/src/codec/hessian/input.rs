// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hessian-compatible reader.

use super::*;
use crate::buffer::BufferedInput;
use crate::bunch::utf;
use crate::codec::{self, DataInput};
use crate::config::Codec;
use crate::constants::PrimitiveKind;
use crate::error::{Error, Result};
use crate::object::PrimitiveArray;

#[inline]
fn unexpected(expected: &str, tag: u8) -> Error {
    Error::corrupted(format!("expected {} but got tag 0x{:02x}", expected, tag))
}

pub struct HessianInput {
    input: BufferedInput,
}

impl HessianInput {
    pub fn new(input: BufferedInput) -> Self {
        Self { input }
    }

    #[inline]
    fn byte(&mut self) -> Result<u8> {
        self.input.read_u8()
    }

    fn be<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.input.read_bytes(&mut bytes)?;
        Ok(bytes)
    }

    fn u16_len(&mut self) -> Result<usize> {
        Ok(usize::from(u16::from_be_bytes(self.be()?)))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.byte()? {
            TRUE => Ok(true),
            FALSE => Ok(false),
            tag => Err(unexpected("boolean", tag)),
        }
    }

    pub fn read_int(&mut self) -> Result<i32> {
        let tag = self.byte()?;
        match tag {
            INT_DIRECT_TAG_MIN..=INT_DIRECT_TAG_MAX => Ok(i32::from(tag) - i32::from(INT_ZERO)),
            INT_BYTE_TAG_MIN..=INT_BYTE_TAG_MAX => {
                let high = i32::from(tag) - i32::from(INT_BYTE_ZERO);
                Ok((high << 8) + i32::from(self.byte()?))
            }
            INT_SHORT_TAG_MIN..=INT_SHORT_TAG_MAX => {
                let high = i32::from(tag) - i32::from(INT_SHORT_ZERO);
                let [b1, b0] = self.be::<2>()?;
                Ok((high << 16) + (i32::from(b1) << 8) + i32::from(b0))
            }
            INT => Ok(i32::from_be_bytes(self.be()?)),
            _ => Err(unexpected("int", tag)),
        }
    }

    pub fn read_long(&mut self) -> Result<i64> {
        let tag = self.byte()?;
        match tag {
            LONG_DIRECT_TAG_MIN..=LONG_DIRECT_TAG_MAX => {
                Ok(i64::from(tag) - i64::from(LONG_ZERO))
            }
            LONG_BYTE_TAG_MIN..=LONG_BYTE_TAG_MAX => {
                let high = i64::from(tag) - i64::from(LONG_BYTE_ZERO);
                Ok((high << 8) + i64::from(self.byte()?))
            }
            LONG_SHORT_TAG_MIN..=LONG_SHORT_TAG_MAX => {
                let high = i64::from(tag) - i64::from(LONG_SHORT_ZERO);
                let [b1, b0] = self.be::<2>()?;
                Ok((high << 16) + (i64::from(b1) << 8) + i64::from(b0))
            }
            LONG_INT => Ok(i64::from(i32::from_be_bytes(self.be()?))),
            LONG => Ok(i64::from_be_bytes(self.be()?)),
            _ => Err(unexpected("long", tag)),
        }
    }

    pub fn read_double(&mut self) -> Result<f64> {
        let tag = self.byte()?;
        match tag {
            DOUBLE_ZERO => Ok(0.0),
            DOUBLE_ONE => Ok(1.0),
            DOUBLE_BYTE => Ok(f64::from(self.byte()? as i8)),
            DOUBLE_SHORT => Ok(f64::from(i16::from_be_bytes(self.be()?))),
            DOUBLE_FLOAT => Ok(f64::from(f32::from_be_bytes(self.be()?))),
            DOUBLE => Ok(f64::from_be_bytes(self.be()?)),
            _ => Err(unexpected("double", tag)),
        }
    }

    pub fn read_byte(&mut self) -> Result<i8> {
        let value = self.read_int()?;
        i8::try_from(value)
            .map_err(|_| Error::corrupted(format!("byte value {} out of range", value)))
    }

    pub fn read_short(&mut self) -> Result<i16> {
        let value = self.read_int()?;
        i16::try_from(value)
            .map_err(|_| Error::corrupted(format!("short value {} out of range", value)))
    }

    /// A char travels as a one-character string.
    pub fn read_char(&mut self) -> Result<u16> {
        let tag = self.byte()?;
        let len = match tag {
            1 => 1,
            STRING_FINAL => self.u16_len()?,
            _ => return Err(unexpected("char", tag)),
        };
        if len != 1 {
            return Err(Error::corrupted(format!(
                "expected a one-character string for char, got length {}",
                len
            )));
        }
        let lead = self.byte()?;
        let mut bytes = [lead, 0, 0];
        let width = match lead >> 4 {
            0x0..=0x7 => 1,
            0xC | 0xD => 2,
            0xE => 3,
            _ => return Err(unexpected("char", lead)),
        };
        self.input.read_bytes(&mut bytes[1..width])?;
        match utf::decode_units(&bytes[..width])?.as_slice() {
            [unit] => Ok(*unit),
            _ => Err(Error::corrupted("char did not decode to one unit")),
        }
    }

    /// Append `count` UTF-8 encoded characters to `dst`.
    fn read_chars(&mut self, count: usize, dst: &mut Vec<u8>) -> Result<()> {
        for _ in 0..count {
            let lead = self.byte()?;
            let width = match lead {
                0x00..=0x7f => 1,
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                _ => {
                    return Err(Error::corrupted(format!(
                        "malformed UTF-8 lead byte 0x{:02x} in string",
                        lead
                    )))
                }
            };
            dst.push(lead);
            for _ in 1..width {
                dst.push(self.byte()?);
            }
        }
        Ok(())
    }

    pub fn read_string(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        loop {
            let tag = self.byte()?;
            match tag {
                NULL if bytes.is_empty() => return Ok(None),
                0x00..=0x1f => {
                    self.read_chars(usize::from(tag), &mut bytes)?;
                    break;
                }
                STRING_MEDIUM_TAG_MIN..=STRING_MEDIUM_TAG_MAX => {
                    let len = (usize::from(tag - STRING_MEDIUM_TAG_MIN) << 8)
                        + usize::from(self.byte()?);
                    self.read_chars(len, &mut bytes)?;
                    break;
                }
                STRING_FINAL => {
                    let len = self.u16_len()?;
                    self.read_chars(len, &mut bytes)?;
                    break;
                }
                STRING_CHUNK => {
                    let len = self.u16_len()?;
                    self.read_chars(len, &mut bytes)?;
                }
                _ => return Err(unexpected("string", tag)),
            }
        }
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| Error::corrupted(format!("invalid UTF-8 in string: {}", e)))
    }

    /// Fill `dst` from a binary value whose total length must match.
    pub fn read_binary(&mut self, dst: &mut [u8]) -> Result<()> {
        let bytes = self.read_binary_vec(dst.len())?;
        dst.copy_from_slice(&bytes);
        Ok(())
    }

    /// Read a binary value of exactly `expected` bytes. Memory grows with
    /// the chunks actually received.
    pub fn read_binary_vec(&mut self, expected: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        loop {
            let tag = self.byte()?;
            let (len, last) = match tag {
                BINARY_DIRECT..=0x2f => (usize::from(tag - BINARY_DIRECT), true),
                BINARY_FINAL => (self.u16_len()?, true),
                BINARY_CHUNK => (self.u16_len()?, false),
                _ => return Err(unexpected("binary", tag)),
            };
            let done = bytes.len();
            if done + len > expected {
                return Err(Error::corrupted(format!(
                    "binary of at least {} bytes does not fit an array of {}",
                    done + len,
                    expected
                )));
            }
            bytes.resize(done + len, 0);
            self.input.read_bytes(&mut bytes[done..])?;
            if last {
                break;
            }
        }
        if bytes.len() != expected {
            return Err(Error::corrupted(format!(
                "binary of {} bytes for an array of {}",
                bytes.len(),
                expected
            )));
        }
        Ok(bytes)
    }

    pub fn close(&mut self) {
        self.input.close();
    }
}

impl DataInput for HessianInput {
    fn codec(&self) -> Codec {
        Codec::Hessian
    }

    fn read_bool(&mut self) -> Result<bool> {
        HessianInput::read_bool(self)
    }

    fn read_byte(&mut self) -> Result<i8> {
        HessianInput::read_byte(self)
    }

    fn read_char(&mut self) -> Result<u16> {
        HessianInput::read_char(self)
    }

    fn read_short(&mut self) -> Result<i16> {
        HessianInput::read_short(self)
    }

    fn read_int(&mut self) -> Result<i32> {
        HessianInput::read_int(self)
    }

    fn read_long(&mut self) -> Result<i64> {
        HessianInput::read_long(self)
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(HessianInput::read_double(self)? as f32)
    }

    fn read_double(&mut self) -> Result<f64> {
        HessianInput::read_double(self)
    }

    fn read_utf(&mut self) -> Result<Option<String>> {
        self.read_string()
    }

    fn read_array_bool(&mut self, dst: &mut [bool]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_bool(self)?;
        }
        Ok(())
    }

    fn read_array_byte(&mut self, dst: &mut [i8]) -> Result<()> {
        let bytes = self.read_binary_vec(dst.len())?;
        for (slot, b) in dst.iter_mut().zip(bytes) {
            *slot = b as i8;
        }
        Ok(())
    }

    fn read_array_char(&mut self, dst: &mut [u16]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_char(self)?;
        }
        Ok(())
    }

    fn read_array_short(&mut self, dst: &mut [i16]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_short(self)?;
        }
        Ok(())
    }

    fn read_array_int(&mut self, dst: &mut [i32]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_int(self)?;
        }
        Ok(())
    }

    fn read_array_long(&mut self, dst: &mut [i64]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_long(self)?;
        }
        Ok(())
    }

    fn read_array_float(&mut self, dst: &mut [f32]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_double(self)? as f32;
        }
        Ok(())
    }

    fn read_array_double(&mut self, dst: &mut [f64]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = HessianInput::read_double(self)?;
        }
        Ok(())
    }

    fn read_primitive_array(&mut self, kind: PrimitiveKind, len: usize) -> Result<PrimitiveArray> {
        match kind {
            // one binary value; splitting it would change the framing
            PrimitiveKind::Byte => {
                let bytes = self.read_binary_vec(len)?;
                Ok(PrimitiveArray::Byte(bytes.into_iter().map(|b| b as i8).collect()))
            }
            _ => codec::read_array_in_runs(self, kind, len),
        }
    }

    fn close(&mut self) {
        HessianInput::close(self);
    }

    fn bytes_read(&self) -> u64 {
        self.input.bytes_read()
    }

    fn reset_bytes_read(&mut self) {
        self.input.reset_bytes_read();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn input(bytes: &[u8]) -> HessianInput {
        HessianInput::new(BufferedInput::new(Box::new(Cursor::new(bytes.to_vec())), 64))
    }

    #[test]
    fn decodes_every_int_byte_tag() {
        // The decoder accepts the full two-byte range even though the encoder
        // only emits part of it.
        assert_eq!(input(&[0xc0, 0x00]).read_int().expect("valid"), -2048);
        assert_eq!(input(&[0xd0, 0x00, 0x00]).read_int().expect("valid"), -262_144);
        assert_eq!(input(&[0x80]).read_int().expect("valid"), -16);
    }

    #[test]
    fn decodes_long_short_tag_bounds() {
        assert_eq!(input(&[0x38, 0x00, 0x00]).read_long().expect("valid"), -262_144);
        assert_eq!(input(&[0x3f, 0xff, 0xff]).read_long().expect("valid"), 262_143);
        assert_eq!(input(&[0xf0, 0x00]).read_long().expect("valid"), -2048);
        assert_eq!(input(&[0xff, 0xff]).read_long().expect("valid"), 2047);
    }

    #[test]
    fn wrong_double_tag_is_corruption() {
        let err = input(&[0x66]).read_double().expect_err("0x66 is not a double");
        assert!(matches!(err, Error::StreamCorrupted { .. }));
        assert!(err.to_string().contains("double"));
    }

    #[test]
    fn out_of_range_byte_is_rejected() {
        let err = input(&[0xc9, 0x00]).read_byte().expect_err("256 is not a byte");
        assert!(err.to_string().contains("byte value 256"));
    }

    #[test]
    fn char_accepts_both_string_forms() {
        assert_eq!(input(&[0x01, b'q']).read_char().expect("valid"), u16::from(b'q'));
        assert_eq!(
            input(&[b'S', 0x00, 0x01, 0xe2, 0x82, 0xac]).read_char().expect("valid"),
            0x20ac
        );
        assert!(input(&[0x02, b'a', b'b']).read_char().is_err());
    }

    #[test]
    fn medium_and_chunked_strings() {
        assert_eq!(
            input(&[0x30, 0x03, b'a', b'b', b'c']).read_string().expect("valid"),
            Some("abc".to_string())
        );
        assert_eq!(
            input(&[b's', 0x00, 0x02, b'a', b'b', 0x01, b'c']).read_string().expect("valid"),
            Some("abc".to_string())
        );
        assert_eq!(input(&[b'N']).read_string().expect("valid"), None);
    }

    #[test]
    fn binary_length_must_match() {
        let mut dst = [0u8; 3];
        input(&[0x23, 1, 2, 3]).read_binary(&mut dst).expect("valid");
        assert_eq!(dst, [1, 2, 3]);

        let mut short = [0u8; 2];
        assert!(input(&[0x23, 1, 2, 3]).read_binary(&mut short).is_err());
    }
}
