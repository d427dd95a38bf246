// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bunching reader.

use super::{utf, BunchHeader, Lane};
use crate::buffer::conversion::Element;
use crate::buffer::BufferedInput;
use crate::codec::{self, DataInput};
use crate::config::{Codec, IoConfig};
use crate::constants::{PrimitiveKind, HEADER_SLOTS};
use crate::error::{Error, Result};
use crate::object::PrimitiveArray;

/// Generate a scalar read that pops from a lane, pulling in the next bunch
/// when the lane is drained.
macro_rules! bunched_scalar {
    ($name:ident, $type:ty, $lane:ident) => {
        pub fn $name(&mut self) -> Result<$type> {
            if self.direct {
                let mut value = [<$type>::default()];
                self.input.read_array(&mut value)?;
                return Ok(value[0]);
            }
            loop {
                if let Some(value) = self.$lane.pop() {
                    return Ok(value);
                }
                self.receive()?;
            }
        }
    };
}

/// Generate an array read mirroring the writer's direct/unbunched decision.
macro_rules! bunched_array {
    ($name:ident, $type:ty, $scalar:ident) => {
        pub fn $name(&mut self, dst: &mut [$type]) -> Result<()> {
            if self.is_small(dst.len(), <$type as Element>::SIZE) {
                for slot in dst.iter_mut() {
                    *slot = self.$scalar()?;
                }
                return Ok(());
            }
            if !self.direct {
                self.next_direct_array()?;
            }
            self.input.read_array(dst)
        }
    };
}

/// Native-codec reader.
pub struct BunchInput {
    input: BufferedInput,
    direct: bool,
    asserts: bool,
    small_array_bound: usize,
    bytes: Lane<i8>,
    chars: Lane<u16>,
    shorts: Lane<i16>,
    ints: Lane<i32>,
    longs: Lane<i64>,
    floats: Lane<f32>,
    doubles: Lane<f64>,
    arrays_pos: usize,
    arrays_max: usize,
    bunches: u64,
}

impl BunchInput {
    pub fn new(input: BufferedInput, config: &IoConfig) -> Self {
        Self {
            input,
            direct: config.no_array_buffers,
            asserts: config.asserts,
            small_array_bound: config.small_array_bound,
            bytes: Lane::new(config.typed_capacity(1)),
            chars: Lane::new(config.typed_capacity(2)),
            shorts: Lane::new(config.typed_capacity(2)),
            ints: Lane::new(config.typed_capacity(4)),
            longs: Lane::new(config.typed_capacity(8)),
            floats: Lane::new(config.typed_capacity(4)),
            doubles: Lane::new(config.typed_capacity(8)),
            arrays_pos: 0,
            arrays_max: 0,
            bunches: 0,
        }
    }

    /// Number of bunches received so far.
    #[must_use]
    pub fn bunches(&self) -> u64 {
        self.bunches
    }

    fn leftover(&self) -> usize {
        self.bytes.remaining()
            + self.chars.remaining()
            + self.shorts.remaining()
            + self.ints.remaining()
            + self.longs.remaining()
            + self.floats.remaining()
            + self.doubles.remaining()
            + (self.arrays_max - self.arrays_pos)
    }

    /// Pull the next bunch header and its lanes from the byte layer.
    fn receive(&mut self) -> Result<()> {
        if self.asserts {
            let left = self.leftover();
            if left > 0 {
                return Err(Error::internal(format!(
                    "receive called with {} unread values in the current bunch",
                    left
                )));
            }
        }

        let mut slots = [0i16; HEADER_SLOTS];
        self.input.read_array(&mut slots)?;
        let header = BunchHeader::from_slots(&slots).ok_or_else(|| {
            Error::corrupted(format!("negative count in bunch header {:?}", slots))
        })?;
        log::trace!("[bunch] receive {:?}", header);

        self.input.read_array(self.bytes.prepare(header.bytes))?;
        self.input.read_array(self.chars.prepare(header.chars))?;
        self.input.read_array(self.shorts.prepare(header.shorts))?;
        self.input.read_array(self.ints.prepare(header.ints))?;
        self.input.read_array(self.longs.prepare(header.longs))?;
        self.input.read_array(self.floats.prepare(header.floats))?;
        self.input.read_array(self.doubles.prepare(header.doubles))?;
        self.arrays_pos = 0;
        self.arrays_max = header.arrays;
        self.bunches += 1;
        Ok(())
    }

    /// Claim the next direct array of the current bunch, receiving as needed.
    fn next_direct_array(&mut self) -> Result<()> {
        while self.arrays_pos >= self.arrays_max {
            self.receive()?;
        }
        self.arrays_pos += 1;
        Ok(())
    }

    /// Arrays below the bound travel through the lanes.
    fn is_small(&self, len: usize, size: usize) -> bool {
        !self.direct && len < self.small_array_bound / size
    }

    /// A run the writer sent outside the lanes, grown as bytes arrive so a
    /// corrupt length fails at the end of the stream.
    fn read_direct_run<T: Element>(&mut self, len: usize) -> Result<Vec<T>> {
        if !self.direct {
            self.next_direct_array()?;
        }
        let input = &mut self.input;
        codec::read_growing(len, |run| input.read_array(run))
    }

    bunched_scalar!(read_byte, i8, bytes);
    bunched_scalar!(read_char, u16, chars);
    bunched_scalar!(read_short, i16, shorts);
    bunched_scalar!(read_int, i32, ints);
    bunched_scalar!(read_long, i64, longs);
    bunched_scalar!(read_float, f32, floats);
    bunched_scalar!(read_double, f64, doubles);

    pub fn read_bool(&mut self) -> Result<bool> {
        if self.direct {
            let mut value = [false];
            self.input.read_array(&mut value)?;
            return Ok(value[0]);
        }
        Ok(self.read_byte()? != 0)
    }

    fn read_raw_byte(&mut self) -> Result<u8> {
        Ok(self.read_byte()? as u8)
    }

    bunched_array!(read_array_bool, bool, read_bool);
    bunched_array!(read_array_byte, i8, read_byte);
    bunched_array!(read_raw_bytes, u8, read_raw_byte);
    bunched_array!(read_array_char, u16, read_char);
    bunched_array!(read_array_short, i16, read_short);
    bunched_array!(read_array_int, i32, read_int);
    bunched_array!(read_array_long, i64, read_long);
    bunched_array!(read_array_float, f32, read_float);
    bunched_array!(read_array_double, f64, read_double);

    pub fn read_utf(&mut self) -> Result<Option<String>> {
        let len = self.read_int()?;
        if len == -1 {
            return Ok(None);
        }
        let len = usize::try_from(len)
            .map_err(|_| Error::corrupted(format!("negative string length {}", len)))?;
        let bytes = if self.is_small(len, 1) {
            let mut bytes = vec![0u8; len];
            self.read_raw_bytes(&mut bytes)?;
            bytes
        } else {
            self.read_direct_run::<u8>(len)?
        };
        utf::decode(&bytes).map(Some)
    }

    pub fn close(&mut self) {
        self.input.close();
        self.bytes.clear();
        self.chars.clear();
        self.shorts.clear();
        self.ints.clear();
        self.longs.clear();
        self.floats.clear();
        self.doubles.clear();
        self.arrays_pos = 0;
        self.arrays_max = 0;
    }
}

impl DataInput for BunchInput {
    fn codec(&self) -> Codec {
        Codec::Native
    }

    fn read_bool(&mut self) -> Result<bool> {
        BunchInput::read_bool(self)
    }

    fn read_byte(&mut self) -> Result<i8> {
        BunchInput::read_byte(self)
    }

    fn read_char(&mut self) -> Result<u16> {
        BunchInput::read_char(self)
    }

    fn read_short(&mut self) -> Result<i16> {
        BunchInput::read_short(self)
    }

    fn read_int(&mut self) -> Result<i32> {
        BunchInput::read_int(self)
    }

    fn read_long(&mut self) -> Result<i64> {
        BunchInput::read_long(self)
    }

    fn read_float(&mut self) -> Result<f32> {
        BunchInput::read_float(self)
    }

    fn read_double(&mut self) -> Result<f64> {
        BunchInput::read_double(self)
    }

    fn read_utf(&mut self) -> Result<Option<String>> {
        BunchInput::read_utf(self)
    }

    fn read_array_bool(&mut self, dst: &mut [bool]) -> Result<()> {
        BunchInput::read_array_bool(self, dst)
    }

    fn read_array_byte(&mut self, dst: &mut [i8]) -> Result<()> {
        BunchInput::read_array_byte(self, dst)
    }

    fn read_array_char(&mut self, dst: &mut [u16]) -> Result<()> {
        BunchInput::read_array_char(self, dst)
    }

    fn read_array_short(&mut self, dst: &mut [i16]) -> Result<()> {
        BunchInput::read_array_short(self, dst)
    }

    fn read_array_int(&mut self, dst: &mut [i32]) -> Result<()> {
        BunchInput::read_array_int(self, dst)
    }

    fn read_array_long(&mut self, dst: &mut [i64]) -> Result<()> {
        BunchInput::read_array_long(self, dst)
    }

    fn read_array_float(&mut self, dst: &mut [f32]) -> Result<()> {
        BunchInput::read_array_float(self, dst)
    }

    fn read_array_double(&mut self, dst: &mut [f64]) -> Result<()> {
        BunchInput::read_array_double(self, dst)
    }

    fn read_primitive_array(&mut self, kind: PrimitiveKind, len: usize) -> Result<PrimitiveArray> {
        if self.is_small(len, kind.size()) {
            return codec::read_array_in_runs(self, kind, len);
        }
        Ok(match kind {
            PrimitiveKind::Boolean => PrimitiveArray::Boolean(self.read_direct_run(len)?),
            PrimitiveKind::Byte => PrimitiveArray::Byte(self.read_direct_run(len)?),
            PrimitiveKind::Char => PrimitiveArray::Char(self.read_direct_run(len)?),
            PrimitiveKind::Short => PrimitiveArray::Short(self.read_direct_run(len)?),
            PrimitiveKind::Int => PrimitiveArray::Int(self.read_direct_run(len)?),
            PrimitiveKind::Long => PrimitiveArray::Long(self.read_direct_run(len)?),
            PrimitiveKind::Float => PrimitiveArray::Float(self.read_direct_run(len)?),
            PrimitiveKind::Double => PrimitiveArray::Double(self.read_direct_run(len)?),
        })
    }

    fn close(&mut self) {
        BunchInput::close(self);
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
    use crate::buffer::{BufferedOutput, MemorySink};
    use crate::bunch::BunchOutput;
    use std::io::Cursor;

    fn encode(config: &IoConfig, body: impl FnOnce(&mut BunchOutput)) -> Vec<u8> {
        let sink = MemorySink::new();
        let mut out = BunchOutput::new(
            BufferedOutput::new(Box::new(sink.clone()), config.buffer_size),
            config,
        );
        body(&mut out);
        out.flush().expect("flush should succeed");
        sink.contents()
    }

    fn reader(config: &IoConfig, bytes: Vec<u8>) -> BunchInput {
        BunchInput::new(
            BufferedInput::new(Box::new(Cursor::new(bytes)), config.buffer_size),
            config,
        )
    }

    #[test]
    fn mixed_scalars_and_arrays_read_back_in_order() {
        let config = IoConfig::default();
        let big: Vec<i64> = (0..100).map(|v| v * 1_000_000_007).collect();
        let bytes = encode(&config, |out| {
            out.write_int(1).expect("write should succeed");
            out.write_array_long(&big).expect("write should succeed");
            out.write_char(0x20ac).expect("write should succeed");
            out.write_array_short(&[4, 5, 6]).expect("write should succeed");
            out.write_utf(Some("caf\u{e9}")).expect("write should succeed");
            out.write_bool(false).expect("write should succeed");
        });

        let mut input = reader(&config, bytes);
        assert_eq!(input.read_int().expect("read should succeed"), 1);
        let mut back = vec![0i64; 100];
        input.read_array_long(&mut back).expect("read should succeed");
        assert_eq!(back, big);
        assert_eq!(input.read_char().expect("read should succeed"), 0x20ac);
        let mut shorts = [0i16; 3];
        input.read_array_short(&mut shorts).expect("read should succeed");
        assert_eq!(shorts, [4, 5, 6]);
        assert_eq!(
            input.read_utf().expect("read should succeed").as_deref(),
            Some("caf\u{e9}")
        );
        assert!(!input.read_bool().expect("read should succeed"));
        assert_eq!(input.bunches(), 1);
    }

    #[test]
    fn negative_header_count_is_corruption() {
        let config = IoConfig::default();
        let mut bytes = Vec::new();
        for slot in [0i16, 0, 0, 0, -2, 0, 0, 0] {
            bytes.extend_from_slice(&slot.to_le_bytes());
        }
        let mut input = reader(&config, bytes);
        assert!(matches!(input.read_int(), Err(Error::StreamCorrupted { .. })));
    }

    #[test]
    fn asserts_catch_a_skewed_reader() {
        let config = IoConfig::default().with_asserts(true);
        let bytes = encode(&config, |out| {
            out.write_int(1).expect("write should succeed");
            out.write_int(2).expect("write should succeed");
            out.flush().expect("flush should succeed");
            out.write_long(3).expect("write should succeed");
        });
        let mut input = reader(&config, bytes);
        assert_eq!(input.read_int().expect("read should succeed"), 1);
        // One int is still pending, so pulling the next bunch is a bug.
        let err = input.read_long().expect_err("skewed read must fail");
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn pass_through_mode_round_trips() {
        let config = IoConfig::default().with_no_array_buffers(true);
        let bytes = encode(&config, |out| {
            out.write_double(2.5).expect("write should succeed");
            out.write_array_int(&[9, 8, 7]).expect("write should succeed");
            out.write_utf(None).expect("write should succeed");
        });
        let mut input = reader(&config, bytes);
        assert_eq!(input.read_double().expect("read should succeed"), 2.5);
        let mut ints = [0i32; 3];
        input.read_array_int(&mut ints).expect("read should succeed");
        assert_eq!(ints, [9, 8, 7]);
        assert_eq!(input.read_utf().expect("read should succeed"), None);
        assert_eq!(input.bunches(), 0);
    }

    #[test]
    fn truncated_stream_reports_end() {
        let config = IoConfig::default();
        let mut bytes = encode(&config, |out| {
            out.write_long(77).expect("write should succeed");
        });
        bytes.truncate(bytes.len() - 3);
        let mut input = reader(&config, bytes);
        assert!(matches!(input.read_long(), Err(Error::EndOfStream)));
    }
}
