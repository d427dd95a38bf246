// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object-graph layer: handles, type numbers and per-type dispatch on top of
//! a primitive codec.

mod copy;
mod handles;
mod input;
mod nesting;
mod output;
mod slots;
mod stats;
mod type_table;

pub use copy::deep_copy;
pub use input::ObjectInput;
pub use nesting::Frame;
pub use output::ObjectOutput;
pub use stats::StreamStats;

/// Outcome of a known-type header, on either side of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownHeader {
    /// Null was written; nothing follows.
    Null,
    /// A new object; its contents follow.
    New,
    /// Reference to the object holding this handle.
    Existing(i32),
}
