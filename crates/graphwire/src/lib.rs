// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # graphwire - handle-based binary object-graph serialization
//!
//! Writes graphs of shared, possibly cyclic objects to a byte stream and
//! reads them back with the same sharing. Every object is sent once; later
//! references are a small integer handle. Type names are sent once per
//! stream and replaced by type numbers afterwards.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use graphwire::{MemorySink, ObjRef, ObjectInput, ObjectOutput, Result};
//!
//! fn main() -> Result<()> {
//!     let sink = MemorySink::new();
//!     let mut out = ObjectOutput::new(sink.clone());
//!     let answer = ObjRef::int(42);
//!     out.write_object(Some(&answer))?;
//!     out.write_object(Some(&answer))?;
//!     out.close()?;
//!
//!     let mut input = ObjectInput::new(Cursor::new(sink.take()));
//!     let first = input.read_object()?.expect("non-null");
//!     let second = input.read_object()?.expect("non-null");
//!     assert!(first.ptr_eq(&second));
//!     assert_eq!(first.as_int(), Some(42));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        Object Graph Layer                           |
//! |   ObjectOutput / ObjectInput: handles, type numbers, RESET/CLEAR    |
//! +---------------------------------------------------------------------+
//! |                     Type Descriptors & Dispatch                     |
//! |   TypeRegistry -> TypeDescriptor -> Strategy                        |
//! +---------------------------------------------------------------------+
//! |               Primitive Codec (DataOutput / DataInput)              |
//! |   BunchOutput / BunchInput (native) | HessianOutput / HessianInput  |
//! +---------------------------------------------------------------------+
//! |                           Byte Buffers                              |
//! |   BufferedOutput / BufferedInput over any Write / Read              |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`graph`] - object streams (start here)
//! - [`object`] - the object model and the per-type field contract
//! - [`types`] - type registration and descriptor cache
//! - [`codec`] - primitive codec traits and the Hessian-compatible codec
//! - [`bunch`] - the native bunching codec
//! - [`buffer`] - buffered byte I/O
//! - [`splitter`] - fan one stream out to several sinks
//! - [`config`] - stream configuration

pub mod buffer;
pub mod bunch;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod graph;
pub mod object;
pub mod splitter;
pub mod types;

pub use buffer::MemorySink;
pub use config::{Codec, IoConfig};
pub use error::{Error, Result};
pub use graph::{deep_copy, Frame, KnownHeader, ObjectInput, ObjectOutput, StreamStats};
pub use object::{
    EnumConstant, Externalizable, ObjRef, Object, ObjectArray, Opaque, Primitive, PrimitiveArray,
    Replacer, Serializable, Value,
};
pub use splitter::{OutputSplitter, SplitterError};
pub use types::{registry, TypeSupport};
