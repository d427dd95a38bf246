// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffered reader over an arbitrary byte source.

use std::io::{ErrorKind, Read};

use super::conversion::Element;
use crate::error::{Error, Result};

/// Fixed-size read buffer in front of a source.
///
/// `start..end` is the unread window. A refill moves the window to the front
/// before reading more, so each source byte is handed out exactly once.
pub struct BufferedInput {
    source: Box<dyn Read>,
    buffer: Box<[u8]>,
    start: usize,
    end: usize,
    bytes_read: u64,
    closed: bool,
}

impl BufferedInput {
    pub fn new(source: Box<dyn Read>, buffer_size: usize) -> Self {
        Self {
            source,
            buffer: vec![0u8; buffer_size.max(16)].into_boxed_slice(),
            start: 0,
            end: 0,
            bytes_read: 0,
            closed: false,
        }
    }

    /// Bytes already pulled from the source but not yet consumed.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.end - self.start
    }

    /// Bytes consumed by callers.
    #[inline]
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn reset_bytes_read(&mut self) {
        self.bytes_read = 0;
    }

    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// One read call on the source, retrying on interruption.
    fn read_source(&mut self, dst_start: usize, dst_end: usize) -> Result<usize> {
        loop {
            match self.source.read(&mut self.buffer[dst_start..dst_end]) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Make at least `want` bytes available (`want` must fit the buffer).
    fn fill(&mut self, want: usize) -> Result<()> {
        debug_assert!(want <= self.buffer.len());
        if self.available() >= want {
            return Ok(());
        }
        if self.start > 0 {
            self.buffer.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        while self.end < want {
            let capacity = self.buffer.len();
            let n = self.read_source(self.end, capacity)?;
            if n == 0 {
                return Err(Error::EndOfStream);
            }
            self.end += n;
        }
        Ok(())
    }

    /// True if at least one more byte can be read.
    pub fn has_more(&mut self) -> Result<bool> {
        self.ensure_open()?;
        match self.fill(1) {
            Ok(()) => Ok(true),
            Err(Error::EndOfStream) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_open()?;
        self.fill(1)?;
        let b = self.buffer[self.start];
        self.start += 1;
        self.bytes_read += 1;
        Ok(b)
    }

    /// Fill `dst` completely or fail with `EndOfStream`.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.ensure_open()?;
        let mut done = 0;
        while done < dst.len() {
            if self.available() == 0 {
                let rest = dst.len() - done;
                if rest >= self.buffer.len() {
                    // Too big to stage: read straight into the caller's slice.
                    let n = loop {
                        match self.source.read(&mut dst[done..]) {
                            Ok(n) => break n,
                            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                            Err(e) => return Err(e.into()),
                        }
                    };
                    if n == 0 {
                        return Err(Error::EndOfStream);
                    }
                    done += n;
                    self.bytes_read += n as u64;
                    continue;
                }
                self.fill(1)?;
            }
            let n = self.available().min(dst.len() - done);
            dst[done..done + n].copy_from_slice(&self.buffer[self.start..self.start + n]);
            self.start += n;
            done += n;
            self.bytes_read += n as u64;
        }
        Ok(())
    }

    /// Unpack a run of elements, refilling as needed.
    pub fn read_array<T: Element>(&mut self, dst: &mut [T]) -> Result<()> {
        self.ensure_open()?;
        let mut done = 0;
        while done < dst.len() {
            self.fill(T::SIZE.min(self.buffer.len()))?;
            let n = (self.available() / T::SIZE).min(dst.len() - done);
            let bytes = n * T::SIZE;
            super::conversion::unpack(
                &self.buffer[self.start..self.start + bytes],
                &mut dst[done..done + n],
            );
            self.start += bytes;
            done += n;
            self.bytes_read += bytes as u64;
        }
        Ok(())
    }

    /// Release the source. Calling it again is a no-op.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.start = 0;
            self.end = 0;
            self.source = Box::new(std::io::empty());
        }
    }
}

impl std::fmt::Debug for BufferedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedInput")
            .field("capacity", &self.buffer.len())
            .field("available", &self.available())
            .field("bytes_read", &self.bytes_read)
            .field("closed", &self.closed)
            .finish()
    }
}
