// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type serialization descriptor.
//!
//! One `TypeDescriptor` exists per type name for the life of the process.
//! It records how the type is written and read (its [`Strategy`]), its
//! inheritance level, and the field counts declared at registration.

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use super::strategy::Strategy;

/// Classification bits of a descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeFlags(u8);

impl TypeFlags {
    pub const NONE: TypeFlags = TypeFlags(0);
    pub const ARRAY: TypeFlags = TypeFlags(1 << 0);
    pub const STRING: TypeFlags = TypeFlags(1 << 1);
    pub const CLASS: TypeFlags = TypeFlags(1 << 2);
    pub const EXTERNALIZABLE: TypeFlags = TypeFlags(1 << 3);
    pub const CUSTOM: TypeFlags = TypeFlags(1 << 4);
    pub const WRAPPER: TypeFlags = TypeFlags(1 << 5);
    pub const ENUM: TypeFlags = TypeFlags(1 << 6);

    #[inline]
    #[must_use]
    pub const fn contains(self, other: TypeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for TypeFlags {
    type Output = TypeFlags;

    fn bitor(self, rhs: TypeFlags) -> TypeFlags {
        TypeFlags(self.0 | rhs.0)
    }
}

impl fmt::Debug for TypeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TypeFlags, &str); 7] = [
            (TypeFlags::ARRAY, "ARRAY"),
            (TypeFlags::STRING, "STRING"),
            (TypeFlags::CLASS, "CLASS"),
            (TypeFlags::EXTERNALIZABLE, "EXTERNALIZABLE"),
            (TypeFlags::CUSTOM, "CUSTOM"),
            (TypeFlags::WRAPPER, "WRAPPER"),
            (TypeFlags::ENUM, "ENUM"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", set.join("|"))
        }
    }
}

/// Number of declared fields per category at one inheritance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldCounts {
    pub double: u16,
    pub long: u16,
    pub float: u16,
    pub int: u16,
    pub short: u16,
    pub char: u16,
    pub byte: u16,
    pub boolean: u16,
    pub reference: u16,
}

impl FieldCounts {
    #[must_use]
    pub fn primitives(&self) -> u32 {
        [
            self.double,
            self.long,
            self.float,
            self.int,
            self.short,
            self.char,
            self.byte,
            self.boolean,
        ]
        .iter()
        .map(|n| u32::from(*n))
        .sum()
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.primitives() + u32::from(self.reference)
    }
}

/// Descriptor of one serializable (or explicitly unsupported) type.
pub struct TypeDescriptor {
    pub(crate) name: Arc<str>,
    pub(crate) flags: TypeFlags,
    pub(crate) fields: FieldCounts,
    pub(crate) super_descriptor: Option<Arc<TypeDescriptor>>,
    pub(crate) level: u32,
    pub(crate) strategy: Strategy,
}

impl TypeDescriptor {
    pub(crate) fn new(name: Arc<str>, flags: TypeFlags, strategy: Strategy) -> Self {
        Self {
            name,
            flags,
            fields: FieldCounts::default(),
            super_descriptor: None,
            level: 0,
            strategy,
        }
    }

    /// Descriptor of a type that cannot be serialized.
    pub(crate) fn unsupported(name: &str) -> Self {
        Self::new(Arc::from(name), TypeFlags::NONE, Strategy::NotSerializable)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    #[must_use]
    pub fn fields(&self) -> FieldCounts {
        self.fields
    }

    #[must_use]
    pub fn super_descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        self.super_descriptor.as_ref()
    }

    /// Inheritance depth: 1 for a custom type without a registered super
    /// type, one more per ancestor; 0 for everything else.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.flags.contains(TypeFlags::ARRAY)
    }

    #[must_use]
    pub fn is_serializable(&self) -> bool {
        !matches!(self.strategy, Strategy::NotSerializable)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("level", &self.level)
            .field("strategy", &self.strategy.label())
            .field(
                "super",
                &self.super_descriptor.as_ref().map(|s| s.name.clone()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let flags = TypeFlags::ARRAY | TypeFlags::WRAPPER;
        assert!(flags.contains(TypeFlags::ARRAY));
        assert!(!flags.contains(TypeFlags::STRING));
        assert_eq!(format!("{:?}", flags), "ARRAY|WRAPPER");
        assert_eq!(format!("{:?}", TypeFlags::NONE), "NONE");
    }

    #[test]
    fn field_counts_sum() {
        let counts = FieldCounts {
            int: 2,
            double: 1,
            reference: 3,
            ..FieldCounts::default()
        };
        assert_eq!(counts.primitives(), 3);
        assert_eq!(counts.total(), 6);
    }
}
