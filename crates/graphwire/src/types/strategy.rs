// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! How a type travels on the wire.
//!
//! The strategy is chosen once, when the descriptor is built, and the graph
//! streams dispatch on it for every object of the type.

use std::fmt;
use std::sync::Arc;

use super::support::{ArrayAllocator, TypeSupport};
use crate::constants::PrimitiveKind;

/// Element type at the bottom of an array type.
#[derive(Clone)]
pub enum ArrayBase {
    Primitive(PrimitiveKind),
    Wrapper(PrimitiveKind),
    String,
    Class,
    /// A registered type that provides an array allocator.
    Registered {
        name: Arc<str>,
        allocator: ArrayAllocator,
    },
}

impl fmt::Debug for ArrayBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayBase::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            ArrayBase::Wrapper(kind) => f.debug_tuple("Wrapper").field(kind).finish(),
            ArrayBase::String => write!(f, "String"),
            ArrayBase::Class => write!(f, "Class"),
            ArrayBase::Registered { name, .. } => {
                f.debug_struct("Registered").field("name", name).finish()
            }
        }
    }
}

/// Dimensions and base element of an array type.
#[derive(Debug, Clone)]
pub struct ArrayShape {
    pub dimensions: usize,
    pub base: ArrayBase,
}

impl ArrayShape {
    /// True for the eight pre-bound one-dimensional primitive arrays.
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.base {
            ArrayBase::Primitive(kind) if self.dimensions == 1 => Some(kind),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub enum Strategy {
    Array(ArrayShape),
    /// Per-level field serialization through [`crate::object::Serializable`].
    Custom(Arc<TypeSupport>),
    Externalizable(Arc<TypeSupport>),
    String,
    Class,
    Enum(Arc<[String]>),
    PrimitiveWrapper(PrimitiveKind),
    NotSerializable,
}

impl Strategy {
    /// Short name for logs and diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Array(_) => "array",
            Strategy::Custom(_) => "custom",
            Strategy::Externalizable(_) => "externalizable",
            Strategy::String => "string",
            Strategy::Class => "class",
            Strategy::Enum(_) => "enum",
            Strategy::PrimitiveWrapper(_) => "wrapper",
            Strategy::NotSerializable => "not-serializable",
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Array(shape) => f.debug_tuple("Array").field(shape).finish(),
            Strategy::Custom(support) => f.debug_tuple("Custom").field(&support.name()).finish(),
            Strategy::Externalizable(support) => f
                .debug_tuple("Externalizable")
                .field(&support.name())
                .finish(),
            Strategy::Enum(variants) => f.debug_tuple("Enum").field(&variants.len()).finish(),
            Strategy::PrimitiveWrapper(kind) => {
                f.debug_tuple("PrimitiveWrapper").field(kind).finish()
            }
            other => write!(f, "{}", other.label()),
        }
    }
}
