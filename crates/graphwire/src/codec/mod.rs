// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive encode/decode seam.
//!
//! The object-graph layer talks to primitives only through [`DataOutput`]
//! and [`DataInput`]. Two codecs implement them:
//!
//! | Codec | Writer | Reader | Layout |
//! |-------|--------|--------|--------|
//! | native | [`BunchOutput`] | [`BunchInput`] | bunched, little-endian, fixed width |
//! | hessian | [`HessianOutput`] | [`HessianInput`] | tagged, big-endian, variable width |
//!
//! Handles and type numbers go through `write_int` / `read_int`, so the
//! handle machinery above is identical for both.

pub mod hessian;

pub use hessian::{HessianInput, HessianOutput};

use std::io::{Read, Write};

use crate::buffer::{BufferedInput, BufferedOutput};
use crate::bunch::{BunchInput, BunchOutput};
use crate::config::{Codec, IoConfig};
use crate::constants::PrimitiveKind;
use crate::error::Result;
use crate::object::PrimitiveArray;

/// Elements allocated per step for an array whose length came off the
/// wire, so a corrupt length runs out of input before it runs out of memory.
pub const GROWTH_STEP: usize = 64 * 1024;

/// Primitive sink used by the object-graph writer.
pub trait DataOutput {
    fn codec(&self) -> Codec;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_byte(&mut self, value: i8) -> Result<()>;
    fn write_char(&mut self, value: u16) -> Result<()>;
    fn write_short(&mut self, value: i16) -> Result<()>;
    fn write_int(&mut self, value: i32) -> Result<()>;
    fn write_long(&mut self, value: i64) -> Result<()>;
    fn write_float(&mut self, value: f32) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;

    /// Write a string; `None` is the null string.
    fn write_utf(&mut self, value: Option<&str>) -> Result<()>;

    fn write_array_bool(&mut self, values: &[bool]) -> Result<()>;
    fn write_array_byte(&mut self, values: &[i8]) -> Result<()>;
    fn write_array_char(&mut self, values: &[u16]) -> Result<()>;
    fn write_array_short(&mut self, values: &[i16]) -> Result<()>;
    fn write_array_int(&mut self, values: &[i32]) -> Result<()>;
    fn write_array_long(&mut self, values: &[i64]) -> Result<()>;
    fn write_array_float(&mut self, values: &[f32]) -> Result<()>;
    fn write_array_double(&mut self, values: &[f64]) -> Result<()>;

    /// Push everything accumulated so far down to the sink.
    fn flush(&mut self) -> Result<()>;

    /// Flush and release the sink. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn bytes_written(&self) -> u64;
    fn reset_bytes_written(&mut self);
}

/// Primitive source used by the object-graph reader.
pub trait DataInput {
    fn codec(&self) -> Codec;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_char(&mut self) -> Result<u16>;
    fn read_short(&mut self) -> Result<i16>;
    fn read_int(&mut self) -> Result<i32>;
    fn read_long(&mut self) -> Result<i64>;
    fn read_float(&mut self) -> Result<f32>;
    fn read_double(&mut self) -> Result<f64>;

    /// Read a string; `None` is the null string.
    fn read_utf(&mut self) -> Result<Option<String>>;

    fn read_array_bool(&mut self, dst: &mut [bool]) -> Result<()>;
    fn read_array_byte(&mut self, dst: &mut [i8]) -> Result<()>;
    fn read_array_char(&mut self, dst: &mut [u16]) -> Result<()>;
    fn read_array_short(&mut self, dst: &mut [i16]) -> Result<()>;
    fn read_array_int(&mut self, dst: &mut [i32]) -> Result<()>;
    fn read_array_long(&mut self, dst: &mut [i64]) -> Result<()>;
    fn read_array_float(&mut self, dst: &mut [f32]) -> Result<()>;
    fn read_array_double(&mut self, dst: &mut [f64]) -> Result<()>;

    /// Read a `len`-element array sent with `write_array_*`.
    fn read_primitive_array(&mut self, kind: PrimitiveKind, len: usize) -> Result<PrimitiveArray> {
        read_array_in_runs(self, kind, len)
    }

    /// Release the source. Idempotent.
    fn close(&mut self);

    fn bytes_read(&self) -> u64;
    fn reset_bytes_read(&mut self);
}

/// Build the writer stack selected by `config.codec` on top of `sink`.
pub fn open_output(sink: Box<dyn Write>, config: &IoConfig) -> Box<dyn DataOutput> {
    let buffered = BufferedOutput::new(sink, config.buffer_size);
    log::debug!(
        "[codec] output opened: codec={} buffer={}",
        config.codec,
        config.buffer_size
    );
    match config.codec {
        Codec::Native => Box::new(BunchOutput::new(buffered, config)),
        Codec::Hessian => Box::new(HessianOutput::new(buffered)),
    }
}

/// Build the reader stack selected by `config.codec` on top of `source`.
pub fn open_input(source: Box<dyn Read>, config: &IoConfig) -> Box<dyn DataInput> {
    let buffered = BufferedInput::new(source, config.buffer_size);
    log::debug!(
        "[codec] input opened: codec={} buffer={}",
        config.codec,
        config.buffer_size
    );
    match config.codec {
        Codec::Native => Box::new(BunchInput::new(buffered, config)),
        Codec::Hessian => Box::new(HessianInput::new(buffered)),
    }
}

/// Grow a vector to `len` elements, at most [`GROWTH_STEP`] at a time,
/// letting `fill` read each new run.
pub(crate) fn read_growing<T: Copy + Default>(
    len: usize,
    mut fill: impl FnMut(&mut [T]) -> Result<()>,
) -> Result<Vec<T>> {
    let mut values = Vec::with_capacity(len.min(GROWTH_STEP));
    while values.len() < len {
        let start = values.len();
        let step = (len - start).min(GROWTH_STEP);
        values.resize(start + step, T::default());
        fill(&mut values[start..])?;
    }
    Ok(values)
}

/// Array read as consecutive slice reads. Only valid for codecs where
/// splitting a run does not change its encoding.
pub(crate) fn read_array_in_runs<I: DataInput + ?Sized>(
    input: &mut I,
    kind: PrimitiveKind,
    len: usize,
) -> Result<PrimitiveArray> {
    macro_rules! runs {
        ($variant:ident, $read:ident) => {
            PrimitiveArray::$variant(read_growing(len, |run| input.$read(run))?)
        };
    }
    Ok(match kind {
        PrimitiveKind::Boolean => runs!(Boolean, read_array_bool),
        PrimitiveKind::Byte => runs!(Byte, read_array_byte),
        PrimitiveKind::Char => runs!(Char, read_array_char),
        PrimitiveKind::Short => runs!(Short, read_array_short),
        PrimitiveKind::Int => runs!(Int, read_array_int),
        PrimitiveKind::Long => runs!(Long, read_array_long),
        PrimitiveKind::Float => runs!(Float, read_array_float),
        PrimitiveKind::Double => runs!(Double, read_array_double),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn growing_read_fills_in_steps() {
        let mut runs = Vec::new();
        let values: Vec<u8> = read_growing(GROWTH_STEP + 3, |run| {
            runs.push(run.len());
            run.fill(7);
            Ok(())
        })
        .expect("filled");
        assert_eq!(values.len(), GROWTH_STEP + 3);
        assert!(values.iter().all(|v| *v == 7));
        assert_eq!(runs, vec![GROWTH_STEP, 3]);
    }

    #[test]
    fn growing_read_stops_at_the_first_failure() {
        let mut calls = 0;
        let result: Result<Vec<i64>> = read_growing(i32::MAX as usize, |_| {
            calls += 1;
            Err(Error::EndOfStream)
        });
        assert!(matches!(result, Err(Error::EndOfStream)));
        assert_eq!(calls, 1);
    }
}
