// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registration record for user types.
//!
//! A `TypeSupport` is what generated (or hand-written) per-type code hands
//! to the registry: how to construct an empty instance while reading, the
//! registered super type, and whether arrays of the type can be allocated.
//!
//! ```ignore
//! registry().register(
//!     TypeSupport::serializable("demo.Node", || Box::new(Node::default()))
//!         .with_super("demo.Base")
//!         .with_arrays(),
//! )?;
//! ```

use std::fmt;
use std::sync::Arc;

use super::descriptor::FieldCounts;
use crate::object::{Externalizable, ObjectArray, Serializable};

/// Creates the empty instance that `read_fields` then fills in.
pub type Factory = fn() -> Box<dyn Serializable>;

pub type ExternalFactory = fn() -> Box<dyn Externalizable>;

/// Allocates an array of `len` null elements whose component type is the
/// given name.
pub type ArrayAllocator = fn(element_type: &str, len: usize) -> ObjectArray;

fn allocate_nulls(element_type: &str, len: usize) -> ObjectArray {
    ObjectArray::with_len(element_type, len)
}

#[derive(Clone)]
pub enum SupportKind {
    Serializable(Factory),
    Externalizable(ExternalFactory),
    Enumeration(Arc<[String]>),
    /// Known by name, never serializable.
    Opaque,
}

impl fmt::Debug for SupportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportKind::Serializable(_) => write!(f, "Serializable"),
            SupportKind::Externalizable(_) => write!(f, "Externalizable"),
            SupportKind::Enumeration(variants) => {
                f.debug_tuple("Enumeration").field(variants).finish()
            }
            SupportKind::Opaque => write!(f, "Opaque"),
        }
    }
}

#[derive(Clone)]
pub struct TypeSupport {
    name: Arc<str>,
    kind: SupportKind,
    super_type: Option<Arc<str>>,
    fields: FieldCounts,
    array_allocator: Option<ArrayAllocator>,
}

impl TypeSupport {
    fn with_kind(name: &str, kind: SupportKind) -> Self {
        Self {
            name: Arc::from(name),
            kind,
            super_type: None,
            fields: FieldCounts::default(),
            array_allocator: None,
        }
    }

    #[must_use]
    pub fn serializable(name: &str, factory: Factory) -> Self {
        Self::with_kind(name, SupportKind::Serializable(factory))
    }

    #[must_use]
    pub fn externalizable(name: &str, factory: ExternalFactory) -> Self {
        Self::with_kind(name, SupportKind::Externalizable(factory))
    }

    /// Enumerations can always be used as array elements.
    #[must_use]
    pub fn enumeration<I, S>(name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants: Arc<[String]> = variants.into_iter().map(Into::into).collect();
        Self::with_kind(name, SupportKind::Enumeration(variants)).with_arrays()
    }

    #[must_use]
    pub fn opaque(name: &str) -> Self {
        Self::with_kind(name, SupportKind::Opaque)
    }

    /// Registered super type whose fields come first (level 1 upwards).
    #[must_use]
    pub fn with_super(mut self, super_type: &str) -> Self {
        self.super_type = Some(Arc::from(super_type));
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: FieldCounts) -> Self {
        self.fields = fields;
        self
    }

    /// Allow arrays of this type, allocated with null elements.
    #[must_use]
    pub fn with_arrays(self) -> Self {
        self.with_array_allocator(allocate_nulls)
    }

    #[must_use]
    pub fn with_array_allocator(mut self, allocator: ArrayAllocator) -> Self {
        self.array_allocator = Some(allocator);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    #[must_use]
    pub fn kind(&self) -> &SupportKind {
        &self.kind
    }

    #[must_use]
    pub fn super_type(&self) -> Option<&str> {
        self.super_type.as_deref()
    }

    #[must_use]
    pub fn fields(&self) -> FieldCounts {
        self.fields
    }

    #[must_use]
    pub fn array_allocator(&self) -> Option<ArrayAllocator> {
        self.array_allocator
    }

    /// New empty instance for the custom strategy.
    pub(crate) fn instantiate(&self) -> Option<Box<dyn Serializable>> {
        match self.kind {
            SupportKind::Serializable(factory) => Some(factory()),
            _ => None,
        }
    }

    pub(crate) fn instantiate_external(&self) -> Option<Box<dyn Externalizable>> {
        match self.kind {
            SupportKind::Externalizable(factory) => Some(factory()),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSupport")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("super_type", &self.super_type)
            .field("arrays", &self.array_allocator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerations_allow_arrays() {
        let support = TypeSupport::enumeration("demo.Color", ["RED", "GREEN"]);
        assert!(support.array_allocator().is_some());
        match support.kind() {
            SupportKind::Enumeration(variants) => assert_eq!(variants.len(), 2),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn opaque_types_have_no_factory() {
        let support = TypeSupport::opaque("demo.Socket");
        assert!(support.instantiate().is_none());
        assert!(support.instantiate_external().is_none());
        assert!(support.array_allocator().is_none());
    }

    #[test]
    fn default_allocator_fills_nulls() {
        let support = TypeSupport::opaque("demo.Thing").with_arrays();
        let allocate = support.array_allocator().expect("allocator set");
        let array = allocate("demo.Thing", 4);
        assert_eq!(array.len(), 4);
        assert!(array.elements.iter().all(Option::is_none));
        assert_eq!(array.type_name(), "demo.Thing[]");
    }
}
