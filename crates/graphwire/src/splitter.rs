// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fan one byte stream out to several sinks.
//!
//! Every write goes to every healthy sink. Failures do not stop the fanout:
//! the remaining sinks still receive the data, and the failures are reported
//! together afterwards as one [`SplitterError`].

use std::fmt;
use std::io::{self, Write};

// ============================================================================
// Errors
// ============================================================================

/// One failed sink.
#[derive(Debug)]
pub struct SinkFailure {
    /// Id returned by [`OutputSplitter::add`].
    pub index: usize,
    pub error: io::Error,
}

/// Failures collected from one or more sinks.
#[derive(Debug, Default)]
pub struct SplitterError {
    failures: Vec<SinkFailure>,
}

impl SplitterError {
    pub fn push(&mut self, index: usize, error: io::Error) {
        self.failures.push(SinkFailure { index, error });
    }

    #[must_use]
    pub fn failures(&self) -> &[SinkFailure] {
        &self.failures
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    fn append(&mut self, other: SplitterError) {
        self.failures.extend(other.failures);
    }
}

impl fmt::Display for SplitterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sink(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, " [#{}: {}]", failure.index, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SplitterError {}

// ============================================================================
// Splitter
// ============================================================================

struct Sink {
    index: usize,
    writer: Box<dyn Write>,
}

/// `Write` implementation duplicating everything onto its sinks.
pub struct OutputSplitter {
    sinks: Vec<Sink>,
    next_index: usize,
    remove_on_error: bool,
    save_errors: bool,
    saved: SplitterError,
    bytes_written: u64,
}

impl OutputSplitter {
    /// - `remove_on_error`: drop a sink after its first failure.
    /// - `save_errors`: keep failures for [`take_errors`](Self::take_errors)
    ///   instead of failing the write.
    #[must_use]
    pub fn new(remove_on_error: bool, save_errors: bool) -> Self {
        Self {
            sinks: Vec::new(),
            next_index: 0,
            remove_on_error,
            save_errors,
            saved: SplitterError::default(),
            bytes_written: 0,
        }
    }

    /// Add a sink; the returned id names it in failures and in [`remove`](Self::remove).
    pub fn add(&mut self, writer: Box<dyn Write>) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        self.sinks.push(Sink { index, writer });
        log::debug!("[splitter] sink #{} added ({} total)", index, self.sinks.len());
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Write>> {
        let position = self.sinks.iter().position(|s| s.index == index)?;
        log::debug!("[splitter] sink #{} removed", index);
        Some(self.sinks.remove(position).writer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Bytes accepted by [`write`](Write::write), counted once regardless of
    /// the number of sinks.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Failures saved since the last call, if any.
    pub fn take_errors(&mut self) -> Option<SplitterError> {
        if self.saved.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.saved))
    }

    /// Flush every sink and drop them all.
    pub fn close(&mut self) -> io::Result<()> {
        let result = self.flush();
        self.sinks.clear();
        log::debug!("[splitter] closed after {} bytes", self.bytes_written);
        result
    }

    fn for_each_sink(&mut self, mut op: impl FnMut(&mut dyn Write) -> io::Result<()>) -> io::Result<()> {
        let mut failed = SplitterError::default();
        for sink in &mut self.sinks {
            if let Err(error) = op(sink.writer.as_mut()) {
                log::debug!("[splitter] sink #{} failed: {}", sink.index, error);
                failed.push(sink.index, error);
            }
        }
        if failed.is_empty() {
            return Ok(());
        }

        if self.remove_on_error {
            let dead: Vec<usize> = failed.failures().iter().map(|f| f.index).collect();
            self.sinks.retain(|s| !dead.contains(&s.index));
            for index in &dead {
                log::warn!("[splitter] sink #{} removed after failure", index);
            }
        }

        if self.save_errors {
            self.saved.append(failed);
            Ok(())
        } else {
            Err(io::Error::other(failed))
        }
    }
}

impl Write for OutputSplitter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.for_each_sink(|w| w.write_all(buf))?;
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.for_each_sink(|w| w.flush())
    }
}

impl fmt::Debug for OutputSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSplitter")
            .field("sinks", &self.sinks.len())
            .field("remove_on_error", &self.remove_on_error)
            .field("save_errors", &self.save_errors)
            .field("bytes_written", &self.bytes_written)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemorySink;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn every_sink_gets_every_byte() {
        let a = MemorySink::new();
        let b = MemorySink::new();
        let mut splitter = OutputSplitter::new(false, false);
        splitter.add(Box::new(a.clone()));
        splitter.add(Box::new(b.clone()));

        splitter.write_all(b"hello").expect("write");
        splitter.flush().expect("flush");
        assert_eq!(a.contents(), b"hello");
        assert_eq!(b.contents(), b"hello");
        assert_eq!(splitter.bytes_written(), 5);
    }

    #[test]
    fn failure_is_reported_after_healthy_sinks_are_written() {
        let healthy = MemorySink::new();
        let mut splitter = OutputSplitter::new(false, false);
        let broken = splitter.add(Box::new(Broken));
        splitter.add(Box::new(healthy.clone()));

        let err = splitter.write(b"abc").expect_err("broken sink");
        assert_eq!(healthy.contents(), b"abc");
        let inner = err
            .get_ref()
            .and_then(|e| e.downcast_ref::<SplitterError>())
            .expect("splitter error");
        assert_eq!(inner.failures()[0].index, broken);
        assert_eq!(splitter.len(), 2);
    }

    #[test]
    fn remove_on_error_drops_the_failed_sink() {
        let healthy = MemorySink::new();
        let mut splitter = OutputSplitter::new(true, false);
        splitter.add(Box::new(Broken));
        splitter.add(Box::new(healthy.clone()));

        assert!(splitter.write(b"one").is_err());
        assert_eq!(splitter.len(), 1);
        splitter.write_all(b"two").expect("remaining sink is healthy");
        assert_eq!(healthy.contents(), b"onetwo");
    }

    #[test]
    fn saved_errors_are_taken_later() {
        let mut splitter = OutputSplitter::new(false, true);
        splitter.add(Box::new(Broken));
        splitter.write_all(b"x").expect("errors are saved");
        splitter.write_all(b"y").expect("errors are saved");

        let saved = splitter.take_errors().expect("two failures");
        assert_eq!(saved.failures().len(), 2);
        assert!(saved.to_string().starts_with("2 sink(s) failed:"));
        assert!(splitter.take_errors().is_none());
    }

    #[test]
    fn remove_returns_the_sink() {
        let mut splitter = OutputSplitter::new(false, false);
        let id = splitter.add(Box::new(MemorySink::new()));
        assert!(splitter.remove(id).is_some());
        assert!(splitter.remove(id).is_none());
        assert!(splitter.is_empty());
    }
}
