// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hessian-compatible writer.

use super::*;
use crate::buffer::BufferedOutput;
use crate::bunch::utf;
use crate::codec::DataOutput;
use crate::config::Codec;
use crate::error::Result;

pub struct HessianOutput {
    out: BufferedOutput,
    scratch: Vec<u8>,
}

impl HessianOutput {
    pub fn new(out: BufferedOutput) -> Self {
        Self {
            out,
            scratch: Vec::new(),
        }
    }

    #[inline]
    fn tag(&mut self, tag: u8) -> Result<()> {
        self.out.write_u8(tag)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.tag(if value { TRUE } else { FALSE })
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        if (INT_DIRECT_MIN..=INT_DIRECT_MAX).contains(&value) {
            self.tag((i32::from(INT_ZERO) + value) as u8)
        } else if (INT_BYTE_MIN..=INT_BYTE_MAX).contains(&value) {
            self.tag((i32::from(INT_BYTE_ZERO) + (value >> 8)) as u8)?;
            self.out.write_u8(value as u8)
        } else if (INT_SHORT_MIN..=INT_SHORT_MAX).contains(&value) {
            self.tag((i32::from(INT_SHORT_ZERO) + (value >> 16)) as u8)?;
            self.out.write_u8((value >> 8) as u8)?;
            self.out.write_u8(value as u8)
        } else {
            self.tag(INT)?;
            self.out.write_bytes(&value.to_be_bytes())
        }
    }

    pub fn write_long(&mut self, value: i64) -> Result<()> {
        if (LONG_DIRECT_MIN..=LONG_DIRECT_MAX).contains(&value) {
            self.tag((i64::from(LONG_ZERO) + value) as u8)
        } else if (LONG_BYTE_MIN..=LONG_BYTE_MAX).contains(&value) {
            self.tag((i64::from(LONG_BYTE_ZERO) + (value >> 8)) as u8)?;
            self.out.write_u8(value as u8)
        } else if (LONG_SHORT_MIN..=LONG_SHORT_MAX).contains(&value) {
            self.tag((i64::from(LONG_SHORT_ZERO) + (value >> 16)) as u8)?;
            self.out.write_u8((value >> 8) as u8)?;
            self.out.write_u8(value as u8)
        } else if let Ok(narrow) = i32::try_from(value) {
            self.tag(LONG_INT)?;
            self.out.write_bytes(&narrow.to_be_bytes())
        } else {
            self.tag(LONG)?;
            self.out.write_bytes(&value.to_be_bytes())
        }
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        // Compare bit patterns so that -0.0 and NaN payloads survive.
        if value.to_bits() == 0 {
            return self.tag(DOUBLE_ZERO);
        }
        if value.to_bits() == 1.0f64.to_bits() {
            return self.tag(DOUBLE_ONE);
        }
        let as_byte = value as i8;
        if f64::from(as_byte).to_bits() == value.to_bits() {
            self.tag(DOUBLE_BYTE)?;
            return self.out.write_u8(as_byte as u8);
        }
        let as_short = value as i16;
        if f64::from(as_short).to_bits() == value.to_bits() {
            self.tag(DOUBLE_SHORT)?;
            return self.out.write_bytes(&as_short.to_be_bytes());
        }
        let as_float = value as f32;
        if f64::from(as_float).to_bits() == value.to_bits() {
            self.tag(DOUBLE_FLOAT)?;
            return self.out.write_bytes(&as_float.to_be_bytes());
        }
        self.tag(DOUBLE)?;
        self.out.write_bytes(&value.to_be_bytes())
    }

    /// A one-character string holding a single UTF-16 unit.
    pub fn write_char(&mut self, value: u16) -> Result<()> {
        self.scratch.clear();
        utf::encode_unit(value, &mut self.scratch);
        self.tag(1)?;
        self.out.write_bytes(&self.scratch)
    }

    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        let Some(s) = value else {
            return self.tag(NULL);
        };
        let count = s.chars().count();
        if count <= STRING_DIRECT_MAX {
            self.tag(count as u8)?;
            return self.out.write_bytes(s.as_bytes());
        }

        let mut rest = s;
        let mut remaining = count;
        while remaining > STRING_CHUNK_SIZE {
            let split = rest
                .char_indices()
                .nth(STRING_CHUNK_SIZE)
                .map_or(rest.len(), |(at, _)| at);
            let (chunk, tail) = rest.split_at(split);
            self.tag(STRING_CHUNK)?;
            self.out.write_bytes(&(STRING_CHUNK_SIZE as u16).to_be_bytes())?;
            self.out.write_bytes(chunk.as_bytes())?;
            rest = tail;
            remaining -= STRING_CHUNK_SIZE;
        }
        if count > STRING_CHUNK_SIZE {
            log::trace!(
                "[hessian] string of {} chars sent in {} chunks",
                count,
                count.div_ceil(STRING_CHUNK_SIZE)
            );
        }
        self.tag(STRING_FINAL)?;
        self.out.write_bytes(&(remaining as u16).to_be_bytes())?;
        self.out.write_bytes(rest.as_bytes())
    }

    pub fn write_binary(&mut self, data: &[u8]) -> Result<()> {
        if data.len() <= BINARY_DIRECT_MAX {
            self.tag(BINARY_DIRECT + data.len() as u8)?;
            return self.out.write_bytes(data);
        }
        let mut rest = data;
        while rest.len() > BINARY_CHUNK_SIZE {
            let (chunk, tail) = rest.split_at(BINARY_CHUNK_SIZE);
            self.tag(BINARY_CHUNK)?;
            self.out.write_bytes(&(BINARY_CHUNK_SIZE as u16).to_be_bytes())?;
            self.out.write_bytes(chunk)?;
            rest = tail;
        }
        self.tag(BINARY_FINAL)?;
        self.out.write_bytes(&(rest.len() as u16).to_be_bytes())?;
        self.out.write_bytes(rest)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()
    }

    pub fn close(&mut self) -> Result<()> {
        self.out.close()
    }
}

impl DataOutput for HessianOutput {
    fn codec(&self) -> Codec {
        Codec::Hessian
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        HessianOutput::write_bool(self, value)
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_int(i32::from(value))
    }

    fn write_char(&mut self, value: u16) -> Result<()> {
        HessianOutput::write_char(self, value)
    }

    fn write_short(&mut self, value: i16) -> Result<()> {
        self.write_int(i32::from(value))
    }

    fn write_int(&mut self, value: i32) -> Result<()> {
        HessianOutput::write_int(self, value)
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        HessianOutput::write_long(self, value)
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_double(f64::from(value))
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        HessianOutput::write_double(self, value)
    }

    fn write_utf(&mut self, value: Option<&str>) -> Result<()> {
        self.write_string(value)
    }

    fn write_array_bool(&mut self, values: &[bool]) -> Result<()> {
        values.iter().try_for_each(|v| HessianOutput::write_bool(self, *v))
    }

    fn write_array_byte(&mut self, values: &[i8]) -> Result<()> {
        let bytes: Vec<u8> = values.iter().map(|v| *v as u8).collect();
        self.write_binary(&bytes)
    }

    fn write_array_char(&mut self, values: &[u16]) -> Result<()> {
        values.iter().try_for_each(|v| HessianOutput::write_char(self, *v))
    }

    fn write_array_short(&mut self, values: &[i16]) -> Result<()> {
        values
            .iter()
            .try_for_each(|v| HessianOutput::write_int(self, i32::from(*v)))
    }

    fn write_array_int(&mut self, values: &[i32]) -> Result<()> {
        values.iter().try_for_each(|v| HessianOutput::write_int(self, *v))
    }

    fn write_array_long(&mut self, values: &[i64]) -> Result<()> {
        values.iter().try_for_each(|v| HessianOutput::write_long(self, *v))
    }

    fn write_array_float(&mut self, values: &[f32]) -> Result<()> {
        values
            .iter()
            .try_for_each(|v| HessianOutput::write_double(self, f64::from(*v)))
    }

    fn write_array_double(&mut self, values: &[f64]) -> Result<()> {
        values.iter().try_for_each(|v| HessianOutput::write_double(self, *v))
    }

    fn flush(&mut self) -> Result<()> {
        HessianOutput::flush(self)
    }

    fn close(&mut self) -> Result<()> {
        HessianOutput::close(self)
    }

    fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }

    fn reset_bytes_written(&mut self) {
        self.out.reset_bytes_written();
    }
}
