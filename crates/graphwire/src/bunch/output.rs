// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bunching writer.

use super::{utf, BunchHeader, Lane};
use crate::buffer::conversion::{self, Element};
use crate::buffer::BufferedOutput;
use crate::codec::DataOutput;
use crate::config::{Codec, IoConfig};
use crate::error::Result;

/// Generate a scalar write that goes to a lane (or straight down when
/// bunching is disabled).
macro_rules! bunched_scalar {
    ($name:ident, $type:ty, $lane:ident) => {
        pub fn $name(&mut self, value: $type) -> Result<()> {
            if self.direct {
                return self.out.write_array(&[value]);
            }
            if self.$lane.is_full() {
                self.internal_flush()?;
            }
            self.$lane.push(value);
            Ok(())
        }
    };
}

/// Generate an array write: small arrays are unbunched into scalars, large
/// ones are queued as direct arrays.
macro_rules! bunched_array {
    ($name:ident, $type:ty, $scalar:ident) => {
        pub fn $name(&mut self, values: &[$type]) -> Result<()> {
            if self.direct {
                return self.out.write_array(values);
            }
            if values.len() < self.config_threshold(<$type as Element>::SIZE) {
                for &value in values {
                    self.$scalar(value)?;
                }
                return Ok(());
            }
            self.queue_array(values)
        }
    };
}

/// Native-codec writer: collects scalars into per-type lanes.
pub struct BunchOutput {
    out: BufferedOutput,
    direct: bool,
    small_array_bound: usize,
    array_buffer: usize,
    bytes: Lane<i8>,
    chars: Lane<u16>,
    shorts: Lane<i16>,
    ints: Lane<i32>,
    longs: Lane<i64>,
    floats: Lane<f32>,
    doubles: Lane<f64>,
    pending: Vec<Vec<u8>>,
    bunches: u64,
}

impl BunchOutput {
    pub fn new(out: BufferedOutput, config: &IoConfig) -> Self {
        Self {
            out,
            direct: config.no_array_buffers,
            small_array_bound: config.small_array_bound,
            array_buffer: config.array_buffer.max(1),
            bytes: Lane::new(config.typed_capacity(1)),
            chars: Lane::new(config.typed_capacity(2)),
            shorts: Lane::new(config.typed_capacity(2)),
            ints: Lane::new(config.typed_capacity(4)),
            longs: Lane::new(config.typed_capacity(8)),
            floats: Lane::new(config.typed_capacity(4)),
            doubles: Lane::new(config.typed_capacity(8)),
            pending: Vec::with_capacity(config.array_buffer),
            bunches: 0,
        }
    }

    #[inline]
    fn config_threshold(&self, element_size: usize) -> usize {
        self.small_array_bound / element_size
    }

    /// Number of bunches emitted so far.
    #[must_use]
    pub fn bunches(&self) -> u64 {
        self.bunches
    }

    bunched_scalar!(write_byte, i8, bytes);
    bunched_scalar!(write_char, u16, chars);
    bunched_scalar!(write_short, i16, shorts);
    bunched_scalar!(write_int, i32, ints);
    bunched_scalar!(write_long, i64, longs);
    bunched_scalar!(write_float, f32, floats);
    bunched_scalar!(write_double, f64, doubles);

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        if self.direct {
            return self.out.write_array(&[value]);
        }
        self.write_byte(i8::from(value))
    }

    fn write_raw_byte(&mut self, value: u8) -> Result<()> {
        self.write_byte(value as i8)
    }

    bunched_array!(write_array_bool, bool, write_bool);
    bunched_array!(write_array_byte, i8, write_byte);
    bunched_array!(write_raw_bytes, u8, write_raw_byte);
    bunched_array!(write_array_char, u16, write_char);
    bunched_array!(write_array_short, i16, write_short);
    bunched_array!(write_array_int, i32, write_int);
    bunched_array!(write_array_long, i64, write_long);
    bunched_array!(write_array_float, f32, write_float);
    bunched_array!(write_array_double, f64, write_double);

    /// Modified UTF-8 with an `i32` byte-length prefix, `-1` for null.
    pub fn write_utf(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            None => self.write_int(-1),
            Some(s) => {
                let bytes = utf::encode(s);
                let len = i32::try_from(bytes.len()).map_err(|_| {
                    crate::error::Error::invalid_object(format!(
                        "string of {} encoded bytes exceeds the wire limit",
                        bytes.len()
                    ))
                })?;
                self.write_int(len)?;
                self.write_raw_bytes(&bytes)
            }
        }
    }

    fn queue_array<T: Element>(&mut self, values: &[T]) -> Result<()> {
        if self.pending.len() >= self.array_buffer {
            self.internal_flush()?;
        }
        log::trace!(
            "[bunch] queue direct {:?} array, {} elements",
            T::KIND,
            values.len()
        );
        self.pending.push(conversion::to_bytes(values));
        Ok(())
    }

    fn header(&self) -> BunchHeader {
        BunchHeader {
            arrays: self.pending.len(),
            bytes: self.bytes.len(),
            chars: self.chars.len(),
            shorts: self.shorts.len(),
            ints: self.ints.len(),
            longs: self.longs.len(),
            floats: self.floats.len(),
            doubles: self.doubles.len(),
        }
    }

    /// Emit the current bunch (header, lanes, queued arrays) to the byte layer.
    fn internal_flush(&mut self) -> Result<()> {
        if self.direct {
            return Ok(());
        }
        let header = self.header();
        if header.is_empty() {
            return Ok(());
        }
        log::trace!("[bunch] flush {:?}", header);

        self.out.write_array(&header.to_slots())?;
        if self.bytes.len() > 0 {
            self.out.write_array(self.bytes.values())?;
        }
        if self.chars.len() > 0 {
            self.out.write_array(self.chars.values())?;
        }
        if self.shorts.len() > 0 {
            self.out.write_array(self.shorts.values())?;
        }
        if self.ints.len() > 0 {
            self.out.write_array(self.ints.values())?;
        }
        if self.longs.len() > 0 {
            self.out.write_array(self.longs.values())?;
        }
        if self.floats.len() > 0 {
            self.out.write_array(self.floats.values())?;
        }
        if self.doubles.len() > 0 {
            self.out.write_array(self.doubles.values())?;
        }
        for payload in &self.pending {
            self.out.write_bytes(payload)?;
        }

        self.pending.clear();
        self.bytes.clear();
        self.chars.clear();
        self.shorts.clear();
        self.ints.clear();
        self.longs.clear();
        self.floats.clear();
        self.doubles.clear();
        self.bunches += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.internal_flush()?;
        self.out.flush()
    }

    pub fn close(&mut self) -> Result<()> {
        if self.out.is_closed() {
            return Ok(());
        }
        let flushed = self.internal_flush();
        let closed = self.out.close();
        flushed.and(closed)
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }
}

impl DataOutput for BunchOutput {
    fn codec(&self) -> Codec {
        Codec::Native
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        BunchOutput::write_bool(self, value)
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        BunchOutput::write_byte(self, value)
    }

    fn write_char(&mut self, value: u16) -> Result<()> {
        BunchOutput::write_char(self, value)
    }

    fn write_short(&mut self, value: i16) -> Result<()> {
        BunchOutput::write_short(self, value)
    }

    fn write_int(&mut self, value: i32) -> Result<()> {
        BunchOutput::write_int(self, value)
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        BunchOutput::write_long(self, value)
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        BunchOutput::write_float(self, value)
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        BunchOutput::write_double(self, value)
    }

    fn write_utf(&mut self, value: Option<&str>) -> Result<()> {
        BunchOutput::write_utf(self, value)
    }

    fn write_array_bool(&mut self, values: &[bool]) -> Result<()> {
        BunchOutput::write_array_bool(self, values)
    }

    fn write_array_byte(&mut self, values: &[i8]) -> Result<()> {
        BunchOutput::write_array_byte(self, values)
    }

    fn write_array_char(&mut self, values: &[u16]) -> Result<()> {
        BunchOutput::write_array_char(self, values)
    }

    fn write_array_short(&mut self, values: &[i16]) -> Result<()> {
        BunchOutput::write_array_short(self, values)
    }

    fn write_array_int(&mut self, values: &[i32]) -> Result<()> {
        BunchOutput::write_array_int(self, values)
    }

    fn write_array_long(&mut self, values: &[i64]) -> Result<()> {
        BunchOutput::write_array_long(self, values)
    }

    fn write_array_float(&mut self, values: &[f32]) -> Result<()> {
        BunchOutput::write_array_float(self, values)
    }

    fn write_array_double(&mut self, values: &[f64]) -> Result<()> {
        BunchOutput::write_array_double(self, values)
    }

    fn flush(&mut self) -> Result<()> {
        BunchOutput::flush(self)
    }

    fn close(&mut self) -> Result<()> {
        BunchOutput::close(self)
    }

    fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }

    fn reset_bytes_written(&mut self) {
        self.out.reset_bytes_written();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemorySink;
    use crate::constants::HEADER_BYTES;

    fn writer(config: &IoConfig) -> (BunchOutput, MemorySink) {
        let sink = MemorySink::new();
        let out = BufferedOutput::new(Box::new(sink.clone()), config.buffer_size);
        (BunchOutput::new(out, config), sink)
    }

    fn header_of(bytes: &[u8]) -> [i16; 8] {
        let mut slots = [0i16; 8];
        conversion::unpack(&bytes[..HEADER_BYTES], &mut slots);
        slots
    }

    #[test]
    fn scalars_share_one_header() {
        let (mut out, sink) = writer(&IoConfig::default());
        out.write_int(7).expect("write should succeed");
        out.write_bool(true).expect("write should succeed");
        out.write_double(0.5).expect("write should succeed");
        out.write_int(8).expect("write should succeed");
        assert!(sink.is_empty());
        out.flush().expect("flush should succeed");

        let bytes = sink.contents();
        assert_eq!(header_of(&bytes), [0, 1, 0, 0, 2, 0, 0, 1]);
        // header, one byte, two ints, one double
        assert_eq!(bytes.len(), HEADER_BYTES + 1 + 8 + 8);
        assert_eq!(bytes[HEADER_BYTES], 1);
        assert_eq!(&bytes[HEADER_BYTES + 1..HEADER_BYTES + 5], &7i32.to_le_bytes());
    }

    #[test]
    fn arrays_at_threshold_go_direct() {
        let config = IoConfig::default();
        let (mut out, sink) = writer(&config);
        let threshold = config.direct_array_threshold(4);

        out.write_array_int(&vec![3; threshold - 1]).expect("write should succeed");
        out.flush().expect("flush should succeed");
        assert_eq!(header_of(&sink.take())[0], 0);

        out.write_array_int(&vec![3; threshold]).expect("write should succeed");
        out.flush().expect("flush should succeed");
        let bytes = sink.take();
        assert_eq!(header_of(&bytes), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), HEADER_BYTES + threshold * 4);
    }

    #[test]
    fn full_lane_forces_a_bunch() {
        let config = IoConfig::default().with_typed_buffer_size(64);
        let (mut out, sink) = writer(&config);
        let capacity = config.typed_capacity(8);
        for v in 0..=capacity as i64 {
            out.write_long(v).expect("write should succeed");
        }
        assert_eq!(out.bunches(), 1);
        out.flush().expect("flush should succeed");
        assert_eq!(out.bunches(), 2);
        assert_eq!(header_of(&sink.contents())[5], capacity as i16);
    }

    #[test]
    fn full_array_queue_forces_a_bunch() {
        let config = IoConfig::default().with_array_buffer(2);
        let (mut out, _sink) = writer(&config);
        let big = vec![1u8; 300];
        out.write_raw_bytes(&big).expect("write should succeed");
        out.write_raw_bytes(&big).expect("write should succeed");
        assert_eq!(out.bunches(), 0);
        out.write_raw_bytes(&big).expect("write should succeed");
        assert_eq!(out.bunches(), 1);
    }

    #[test]
    fn pass_through_mode_writes_no_headers() {
        let config = IoConfig::default().with_no_array_buffers(true);
        let (mut out, sink) = writer(&config);
        out.write_int(1).expect("write should succeed");
        out.write_short(2).expect("write should succeed");
        out.flush().expect("flush should succeed");
        assert_eq!(sink.contents(), vec![1, 0, 0, 0, 2, 0]);
    }

    #[test]
    fn empty_flush_emits_nothing() {
        let (mut out, sink) = writer(&IoConfig::default());
        out.flush().expect("flush should succeed");
        assert!(sink.is_empty());
        assert_eq!(out.bunches(), 0);
    }

    #[test]
    fn null_string_is_minus_one() {
        let (mut out, sink) = writer(&IoConfig::default());
        out.write_utf(None).expect("write should succeed");
        out.flush().expect("flush should succeed");
        let bytes = sink.contents();
        assert_eq!(&bytes[HEADER_BYTES..], &(-1i32).to_le_bytes());
    }
}
