// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte buffer layer.
//!
//! Fixed-size buffers over a byte sink or source with bulk typed array
//! transfer. This layer knows nothing about objects.

pub mod conversion;
pub mod input;
pub mod output;

pub use conversion::Element;
pub use input::BufferedInput;
pub use output::BufferedOutput;

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Growable in-memory sink whose clones share one buffer.
///
/// Hand one clone to a stream and keep another to inspect what was written.
#[derive(Clone, Default)]
pub struct MemorySink {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Move the written bytes out, leaving the sink empty.
    #[must_use]
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.bytes.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySink").field("len", &self.len()).finish()
    }
}
