// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in value shapes.

use super::Value;
use crate::constants::PrimitiveKind;

/// A boxed primitive (`Integer`, `Double`, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Primitive {
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Byte(_) => PrimitiveKind::Byte,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Short(_) => PrimitiveKind::Short,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::Long(_) => PrimitiveKind::Long,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Double(_) => PrimitiveKind::Double,
        }
    }
}

/// Array of one primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Boolean(Vec<bool>),
    Byte(Vec<i8>),
    Char(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl PrimitiveArray {
    /// Zero-filled array of `len` elements.
    #[must_use]
    pub fn zeroed(kind: PrimitiveKind, len: usize) -> Self {
        match kind {
            PrimitiveKind::Boolean => PrimitiveArray::Boolean(vec![false; len]),
            PrimitiveKind::Byte => PrimitiveArray::Byte(vec![0; len]),
            PrimitiveKind::Char => PrimitiveArray::Char(vec![0; len]),
            PrimitiveKind::Short => PrimitiveArray::Short(vec![0; len]),
            PrimitiveKind::Int => PrimitiveArray::Int(vec![0; len]),
            PrimitiveKind::Long => PrimitiveArray::Long(vec![0; len]),
            PrimitiveKind::Float => PrimitiveArray::Float(vec![0.0; len]),
            PrimitiveKind::Double => PrimitiveArray::Double(vec![0.0; len]),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveArray::Boolean(_) => PrimitiveKind::Boolean,
            PrimitiveArray::Byte(_) => PrimitiveKind::Byte,
            PrimitiveArray::Char(_) => PrimitiveKind::Char,
            PrimitiveArray::Short(_) => PrimitiveKind::Short,
            PrimitiveArray::Int(_) => PrimitiveKind::Int,
            PrimitiveArray::Long(_) => PrimitiveKind::Long,
            PrimitiveArray::Float(_) => PrimitiveKind::Float,
            PrimitiveArray::Double(_) => PrimitiveKind::Double,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PrimitiveArray::Boolean(v) => v.len(),
            PrimitiveArray::Byte(v) => v.len(),
            PrimitiveArray::Char(v) => v.len(),
            PrimitiveArray::Short(v) => v.len(),
            PrimitiveArray::Int(v) => v.len(),
            PrimitiveArray::Long(v) => v.len(),
            PrimitiveArray::Float(v) => v.len(),
            PrimitiveArray::Double(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Array whose elements are references.
///
/// `element_type` is the name of the component type, so a `demo.Node[][]`
/// holds elements of type `demo.Node[]`.
#[derive(Debug, Clone, Default)]
pub struct ObjectArray {
    pub element_type: String,
    pub elements: Vec<Value>,
}

impl ObjectArray {
    #[must_use]
    pub fn new(element_type: impl Into<String>, elements: Vec<Value>) -> Self {
        Self {
            element_type: element_type.into(),
            elements,
        }
    }

    /// Array of `len` null elements.
    #[must_use]
    pub fn with_len(element_type: impl Into<String>, len: usize) -> Self {
        Self::new(element_type, vec![None; len])
    }

    #[must_use]
    pub fn type_name(&self) -> String {
        format!("{}[]", self.element_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// One constant of a registered enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub type_name: String,
    pub variant: String,
}

/// Instance of a type that is known by name only and carries no payload.
///
/// Registered opaque types resolve to the unsupported strategy, so an
/// `Opaque` value can never be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    pub type_name: String,
}
