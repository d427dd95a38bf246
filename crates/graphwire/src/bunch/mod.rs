// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bunching layer (native codec).
//!
//! Scalar writes of the same primitive type are collected in per-type lanes
//! and sent together as a *bunch*:
//!
//! ```text
//! +--------------------------------------------------------------+
//! | header: 8 x i16                                              |
//! |   [arrays, bytes, chars, shorts, ints, longs, floats, doubles]|
//! +--------------------------------------------------------------+
//! | byte lane | char lane | ... | double lane   (non-empty only) |
//! +--------------------------------------------------------------+
//! | direct array payloads, in the order they were queued         |
//! +--------------------------------------------------------------+
//! ```
//!
//! Booleans share the byte lane. Arrays whose payload reaches
//! `small_array_bound` bytes are queued as direct arrays; smaller ones are
//! split into scalar writes. With `no_array_buffers` the layer is a
//! pass-through to the byte layer.

pub mod input;
pub mod output;
pub mod utf;

pub use input::BunchInput;
pub use output::BunchOutput;

use crate::constants::{HEADER_SLOTS, SLOT_ARRAYS};

/// One per-type value lane.
#[derive(Debug)]
pub(crate) struct Lane<T> {
    values: Vec<T>,
    capacity: usize,
    pos: usize,
}

impl<T: Copy + Default> Lane<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
            pos: 0,
        }
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub(crate) fn push(&mut self, value: T) {
        self.values.push(value);
    }

    #[inline]
    pub(crate) fn values(&self) -> &[T] {
        &self.values
    }

    /// Values not yet consumed on the read side.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.values.len() - self.pos
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<T> {
        let value = self.values.get(self.pos).copied()?;
        self.pos += 1;
        Some(value)
    }

    /// Resize for an incoming bunch of `count` values and expose the slots.
    pub(crate) fn prepare(&mut self, count: usize) -> &mut [T] {
        self.values.clear();
        self.values.resize(count, T::default());
        self.pos = 0;
        &mut self.values
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.pos = 0;
    }
}

/// Decoded bunch header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BunchHeader {
    pub arrays: usize,
    pub bytes: usize,
    pub chars: usize,
    pub shorts: usize,
    pub ints: usize,
    pub longs: usize,
    pub floats: usize,
    pub doubles: usize,
}

impl BunchHeader {
    pub(crate) fn to_slots(self) -> [i16; HEADER_SLOTS] {
        // Lane capacities are clamped to i16::MAX when they are created.
        [
            self.arrays as i16,
            self.bytes as i16,
            self.chars as i16,
            self.shorts as i16,
            self.ints as i16,
            self.longs as i16,
            self.floats as i16,
            self.doubles as i16,
        ]
    }

    pub(crate) fn from_slots(slots: &[i16; HEADER_SLOTS]) -> Option<Self> {
        if slots.iter().any(|count| *count < 0) {
            return None;
        }
        let count = |i: usize| slots[i] as usize;
        Some(Self {
            arrays: count(SLOT_ARRAYS),
            bytes: count(1),
            chars: count(2),
            shorts: count(3),
            ints: count(4),
            longs: count(5),
            floats: count(6),
            doubles: count(7),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars() == 0 && self.arrays == 0
    }

    /// Total scalar values in the bunch.
    #[must_use]
    pub fn scalars(&self) -> usize {
        self.bytes + self.chars + self.shorts + self.ints + self.longs + self.floats + self.doubles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_tracks_consumption() {
        let mut lane: Lane<i32> = Lane::new(4);
        lane.prepare(2).copy_from_slice(&[5, 6]);
        assert_eq!(lane.remaining(), 2);
        assert_eq!(lane.pop(), Some(5));
        assert_eq!(lane.pop(), Some(6));
        assert_eq!(lane.pop(), None);
        assert_eq!(lane.remaining(), 0);
    }

    #[test]
    fn header_rejects_negative_counts() {
        let mut slots = [0i16; HEADER_SLOTS];
        slots[4] = -3;
        assert!(BunchHeader::from_slots(&slots).is_none());

        slots[4] = 3;
        slots[0] = 1;
        let header = BunchHeader::from_slots(&slots).expect("valid header");
        assert_eq!(header.ints, 3);
        assert_eq!(header.arrays, 1);
        assert_eq!(header.to_slots(), slots);
    }
}
