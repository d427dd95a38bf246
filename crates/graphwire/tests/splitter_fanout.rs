// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One object stream fanned out to several sinks.

use std::io::{self, Cursor, Write};

use graphwire::{Error, MemorySink, ObjRef, ObjectInput, ObjectOutput, OutputSplitter};

/// Accepts `budget` bytes, then fails every write.
struct Flaky {
    budget: usize,
}

impl Write for Flaky {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
        }
        self.budget -= buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn every_copy_decodes_to_the_same_graph() {
    let sinks = [MemorySink::new(), MemorySink::new(), MemorySink::new()];
    let mut splitter = OutputSplitter::new(false, false);
    for sink in &sinks {
        splitter.add(Box::new(sink.clone()));
    }

    let mut out = ObjectOutput::new(splitter);
    let shared = ObjRef::string("fan");
    out.write_object(Some(&shared)).expect("write");
    out.write_object(Some(&shared)).expect("write");
    out.close().expect("close");

    let reference = sinks[0].contents();
    assert!(!reference.is_empty());
    for sink in &sinks {
        assert_eq!(sink.contents(), reference);
        let mut input = ObjectInput::new(Cursor::new(sink.contents()));
        let a = input.read_object().expect("read").expect("a");
        let b = input.read_object().expect("read").expect("b");
        assert!(a.ptr_eq(&b));
        assert_eq!(a.as_string().as_deref(), Some("fan"));
    }
}

#[test]
fn sink_failure_surfaces_as_splitter_error() {
    let healthy = MemorySink::new();
    let mut splitter = OutputSplitter::new(false, false);
    splitter.add(Box::new(healthy.clone()));
    let flaky = splitter.add(Box::new(Flaky { budget: 0 }));

    let mut out = ObjectOutput::new(splitter);
    out.write_object(Some(&ObjRef::string("lost"))).expect("buffered");
    match out.flush() {
        Err(Error::Splitter(failures)) => {
            assert_eq!(failures.failures().len(), 1);
            assert_eq!(failures.failures()[0].index, flaky);
        }
        other => panic!("unexpected {:?}", other),
    }
    // the healthy sink still received the bunch
    assert!(!healthy.is_empty());
}

#[test]
fn saved_errors_let_the_stream_continue() {
    let healthy = MemorySink::new();
    let mut splitter = OutputSplitter::new(true, true);
    splitter.add(Box::new(Flaky { budget: 0 }));
    splitter.add(Box::new(healthy.clone()));

    splitter.write_all(b"abc").expect("error saved");
    splitter.write_all(b"def").expect("failed sink already removed");
    assert_eq!(splitter.len(), 1);
    assert_eq!(splitter.bytes_written(), 6);
    assert_eq!(healthy.contents(), b"abcdef");

    let saved = splitter.take_errors().expect("one failure");
    assert_eq!(saved.failures().len(), 1);
    assert_eq!(
        saved.failures()[0].error.kind(),
        io::ErrorKind::ConnectionReset
    );
    splitter.close().expect("close");
    assert!(splitter.is_empty());
}
