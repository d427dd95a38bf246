// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffered writer over an arbitrary byte sink.

use std::io::Write;

use super::conversion::Element;
use crate::error::{Error, Result};

/// Fixed-size write buffer in front of a sink.
///
/// The buffer goes to the sink when a write would overflow it. Writes larger
/// than the whole buffer bypass it after the pending bytes are out.
pub struct BufferedOutput {
    sink: Box<dyn Write>,
    buffer: Box<[u8]>,
    index: usize,
    bytes_written: u64,
    closed: bool,
}

impl BufferedOutput {
    pub fn new(sink: Box<dyn Write>, buffer_size: usize) -> Self {
        Self {
            sink,
            buffer: vec![0u8; buffer_size.max(16)].into_boxed_slice(),
            index: 0,
            bytes_written: 0,
            closed: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes accepted but not yet handed to the sink.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn reset_bytes_written(&mut self) {
        self.bytes_written = 0;
    }

    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.ensure_open()?;
        if self.index == self.buffer.len() {
            self.drain()?;
        }
        self.buffer[self.index] = value;
        self.index += 1;
        self.bytes_written += 1;
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if self.index + data.len() > self.buffer.len() {
            self.drain()?;
            if data.len() >= self.buffer.len() {
                self.sink.write_all(data)?;
                self.bytes_written += data.len() as u64;
                return Ok(());
            }
        }
        self.buffer[self.index..self.index + data.len()].copy_from_slice(data);
        self.index += data.len();
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Pack a run of elements, draining the buffer as it fills.
    pub fn write_array<T: Element>(&mut self, values: &[T]) -> Result<()> {
        self.ensure_open()?;
        let mut rest = values;
        while !rest.is_empty() {
            let room = (self.buffer.len() - self.index) / T::SIZE;
            if room == 0 {
                self.drain()?;
                continue;
            }
            let n = room.min(rest.len());
            let end = self.index + n * T::SIZE;
            super::conversion::pack(&rest[..n], &mut self.buffer[self.index..end]);
            self.index = end;
            self.bytes_written += (n * T::SIZE) as u64;
            rest = &rest[n..];
        }
        Ok(())
    }

    /// Hand buffered bytes to the sink without flushing the sink itself.
    pub fn drain(&mut self) -> Result<()> {
        if self.index > 0 {
            self.sink.write_all(&self.buffer[..self.index])?;
            self.index = 0;
        }
        Ok(())
    }

    /// Push everything down to the sink and flush it.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.drain()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Flush and release the sink. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.flush();
        self.closed = true;
        self.sink = Box::new(std::io::sink());
        result
    }
}

impl std::fmt::Debug for BufferedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedOutput")
            .field("capacity", &self.buffer.len())
            .field("buffered", &self.index)
            .field("bytes_written", &self.bytes_written)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemorySink;

    #[test]
    fn holds_bytes_until_overflow() {
        let sink = MemorySink::new();
        let mut out = BufferedOutput::new(Box::new(sink.clone()), 16);

        out.write_bytes(&[1; 10]).expect("write should succeed");
        assert!(sink.is_empty());
        assert_eq!(out.buffered(), 10);

        out.write_bytes(&[2; 10]).expect("write should succeed");
        assert_eq!(sink.len(), 10);
        assert_eq!(out.buffered(), 10);
        assert_eq!(out.bytes_written(), 20);
    }

    #[test]
    fn large_write_bypasses_buffer_in_order() {
        let sink = MemorySink::new();
        let mut out = BufferedOutput::new(Box::new(sink.clone()), 16);
        out.write_u8(7).expect("write should succeed");
        out.write_bytes(&[9; 40]).expect("write should succeed");
        let bytes = sink.contents();
        assert_eq!(bytes.len(), 41);
        assert_eq!(bytes[0], 7);
        assert!(bytes[1..].iter().all(|b| *b == 9));
    }

    #[test]
    fn array_spans_several_drains() {
        let sink = MemorySink::new();
        let mut out = BufferedOutput::new(Box::new(sink.clone()), 16);
        let values: Vec<i64> = (0..10).collect();
        out.write_array(&values).expect("write should succeed");
        out.flush().expect("flush should succeed");

        let bytes = sink.contents();
        assert_eq!(bytes.len(), 80);
        assert_eq!(&bytes[72..80], &9i64.to_le_bytes());
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let sink = MemorySink::new();
        let mut out = BufferedOutput::new(Box::new(sink.clone()), 16);
        out.write_u8(1).expect("write should succeed");
        out.close().expect("close should flush");
        out.close().expect("second close is a no-op");
        assert_eq!(sink.contents(), vec![1]);
        assert!(matches!(out.write_u8(2), Err(Error::Closed)));
    }

    #[test]
    fn counter_resets() {
        let mut out = BufferedOutput::new(Box::new(std::io::sink()), 64);
        out.write_array(&[1i32, 2, 3]).expect("write should succeed");
        assert_eq!(out.bytes_written(), 12);
        out.reset_bytes_written();
        assert_eq!(out.bytes_written(), 0);
    }
}
