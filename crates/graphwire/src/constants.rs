// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants shared by every layer of the stream stack.
//!
//! Handles and type numbers travel as plain signed 32-bit integers. The top
//! bit separates the two namespaces: set means "type number follows the
//! object", clear means "handle or control code".

// =======================================================================
// Handle namespace
// =======================================================================

/// Null reference.
pub const NUL_HANDLE: i32 = 0;

/// Control code: discard the handle table, keep the type table.
pub const RESET_HANDLE: i32 = 1;

/// Control code: discard both the handle table and the type table.
pub const CLEAR_HANDLE: i32 = -1;

/// First handle handed out to a real object.
pub const CONTROL_HANDLES: i32 = 2;

// =======================================================================
// Type namespace
// =======================================================================

/// Discriminator bit marking a type number.
pub const TYPE_BIT: i32 = i32::MIN;

/// Mask extracting the type number from a tagged value.
pub const TYPE_MASK: i32 = 0x7FFF_FFFF;

pub const TYPE_BOOLEAN: i32 = 1;
pub const TYPE_BYTE: i32 = 2;
pub const TYPE_CHAR: i32 = 3;
pub const TYPE_SHORT: i32 = 4;
pub const TYPE_INT: i32 = 5;
pub const TYPE_LONG: i32 = 6;
pub const TYPE_FLOAT: i32 = 7;
pub const TYPE_DOUBLE: i32 = 8;

/// First type number available to user types.
pub const PRIMITIVE_TYPES: i32 = 9;

/// First pre-bound type number.
pub const BEGIN_TYPES: i32 = 1;

// =======================================================================
// Bunch header
// =======================================================================

/// Number of `i16` slots in a bunch header.
///
/// Slot 0 counts direct arrays (the boolean slot is reused, booleans travel
/// in the byte lane), slots 1..8 count byte, char, short, int, long, float
/// and double values.
pub const HEADER_SLOTS: usize = (PRIMITIVE_TYPES - BEGIN_TYPES) as usize;

/// Size of an encoded bunch header in bytes.
pub const HEADER_BYTES: usize = HEADER_SLOTS * SIZEOF_SHORT;

/// Header slot that counts direct arrays.
pub const SLOT_ARRAYS: usize = 0;

// =======================================================================
// Element widths
// =======================================================================

pub const SIZEOF_BOOLEAN: usize = 1;
pub const SIZEOF_BYTE: usize = 1;
pub const SIZEOF_CHAR: usize = 2;
pub const SIZEOF_SHORT: usize = 2;
pub const SIZEOF_INT: usize = 4;
pub const SIZEOF_LONG: usize = 8;
pub const SIZEOF_FLOAT: usize = 4;
pub const SIZEOF_DOUBLE: usize = 8;

/// The eight primitive element kinds, in type-number order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// All kinds, ordered by their pre-bound type number.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Pre-bound type number of the array of this kind.
    #[inline]
    #[must_use]
    pub const fn type_number(self) -> i32 {
        match self {
            PrimitiveKind::Boolean => TYPE_BOOLEAN,
            PrimitiveKind::Byte => TYPE_BYTE,
            PrimitiveKind::Char => TYPE_CHAR,
            PrimitiveKind::Short => TYPE_SHORT,
            PrimitiveKind::Int => TYPE_INT,
            PrimitiveKind::Long => TYPE_LONG,
            PrimitiveKind::Float => TYPE_FLOAT,
            PrimitiveKind::Double => TYPE_DOUBLE,
        }
    }

    #[must_use]
    pub const fn from_type_number(number: i32) -> Option<Self> {
        match number {
            TYPE_BOOLEAN => Some(PrimitiveKind::Boolean),
            TYPE_BYTE => Some(PrimitiveKind::Byte),
            TYPE_CHAR => Some(PrimitiveKind::Char),
            TYPE_SHORT => Some(PrimitiveKind::Short),
            TYPE_INT => Some(PrimitiveKind::Int),
            TYPE_LONG => Some(PrimitiveKind::Long),
            TYPE_FLOAT => Some(PrimitiveKind::Float),
            TYPE_DOUBLE => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Encoded width of one element in the native codec.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Boolean => SIZEOF_BOOLEAN,
            PrimitiveKind::Byte => SIZEOF_BYTE,
            PrimitiveKind::Char => SIZEOF_CHAR,
            PrimitiveKind::Short => SIZEOF_SHORT,
            PrimitiveKind::Int => SIZEOF_INT,
            PrimitiveKind::Long => SIZEOF_LONG,
            PrimitiveKind::Float => SIZEOF_FLOAT,
            PrimitiveKind::Double => SIZEOF_DOUBLE,
        }
    }

    /// Index into a per-kind table (0..8).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        (self.type_number() - BEGIN_TYPES) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_bit_splits_namespaces() {
        let tagged = TYPE_INT | TYPE_BIT;
        assert!(tagged < 0);
        assert_eq!(tagged & TYPE_MASK, TYPE_INT);
        assert_eq!(TYPE_BIT as u32, 0x8000_0000);
    }

    #[test]
    fn kinds_round_trip_through_type_numbers() {
        for (i, kind) in PrimitiveKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PrimitiveKind::from_type_number(kind.type_number()), Some(*kind));
        }
        assert_eq!(PrimitiveKind::from_type_number(PRIMITIVE_TYPES), None);
        assert_eq!(HEADER_BYTES, 16);
    }
}
