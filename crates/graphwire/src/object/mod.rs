// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object model handled by the graph streams.
//!
//! A graph node is an [`ObjRef`]: a shared, mutable cell around an
//! [`Object`]. Identity is the cell's address, which is what the writer's
//! handle table keys on. Cycles are ordinary `Rc` cycles; break them by
//! clearing a reference when the graph is no longer needed.

pub mod serializable;
pub mod value;

pub use serializable::{Externalizable, Replacer, Serializable};
pub use value::{EnumConstant, ObjectArray, Opaque, Primitive, PrimitiveArray};

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::types::names;

/// A possibly-null reference.
pub type Value = Option<ObjRef>;

/// Every shape a graph node can take.
pub enum Object {
    String(String),
    /// A type name used as a value.
    Class(String),
    Boxed(Primitive),
    Array(PrimitiveArray),
    Objects(ObjectArray),
    Enum(EnumConstant),
    Custom(Box<dyn Serializable>),
    External(Box<dyn Externalizable>),
    Opaque(Opaque),
}

impl Object {
    /// Wire type name of this value.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Object::String(_) => names::STRING.to_string(),
            Object::Class(_) => names::CLASS.to_string(),
            Object::Boxed(p) => names::wrapper_name(p.kind()).to_string(),
            Object::Array(a) => names::primitive_array_name(a.kind()).to_string(),
            Object::Objects(a) => a.type_name(),
            Object::Enum(e) => e.type_name.clone(),
            Object::Custom(c) => c.type_name().to_string(),
            Object::External(e) => e.type_name().to_string(),
            Object::Opaque(o) => o.type_name.clone(),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::String(s) => f.debug_tuple("String").field(s).finish(),
            Object::Class(name) => f.debug_tuple("Class").field(name).finish(),
            Object::Boxed(p) => f.debug_tuple("Boxed").field(p).finish(),
            Object::Array(a) => f.debug_tuple("Array").field(a).finish(),
            // Elements may point back here; print the shape only.
            Object::Objects(a) => f
                .debug_struct("Objects")
                .field("element_type", &a.element_type)
                .field("len", &a.len())
                .finish(),
            Object::Enum(e) => f.debug_tuple("Enum").field(e).finish(),
            Object::Custom(c) => f.debug_tuple("Custom").field(&c.type_name()).finish(),
            Object::External(e) => f.debug_tuple("External").field(&e.type_name()).finish(),
            Object::Opaque(o) => f.debug_tuple("Opaque").field(o).finish(),
        }
    }
}

/// Shared handle to a graph node.
#[derive(Clone)]
pub struct ObjRef(Rc<RefCell<Object>>);

impl ObjRef {
    #[must_use]
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Object::String(value.into()))
    }

    #[must_use]
    pub fn class(type_name: impl Into<String>) -> Self {
        Self::new(Object::Class(type_name.into()))
    }

    #[must_use]
    pub fn boxed(value: Primitive) -> Self {
        Self::new(Object::Boxed(value))
    }

    #[must_use]
    pub fn int(value: i32) -> Self {
        Self::boxed(Primitive::Int(value))
    }

    #[must_use]
    pub fn array(values: PrimitiveArray) -> Self {
        Self::new(Object::Array(values))
    }

    #[must_use]
    pub fn objects(array: ObjectArray) -> Self {
        Self::new(Object::Objects(array))
    }

    #[must_use]
    pub fn enum_constant(type_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self::new(Object::Enum(EnumConstant {
            type_name: type_name.into(),
            variant: variant.into(),
        }))
    }

    #[must_use]
    pub fn custom<T: Serializable>(value: T) -> Self {
        Self::new(Object::Custom(Box::new(value)))
    }

    #[must_use]
    pub fn external<T: Externalizable>(value: T) -> Self {
        Self::new(Object::External(Box::new(value)))
    }

    /// Address of the shared cell; equal for clones of the same node.
    #[inline]
    #[must_use]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// # Panics
    ///
    /// If the node is currently mutably borrowed (for instance while its own
    /// fields are being read).
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    /// Like [`borrow`](Self::borrow), but fails with
    /// [`Error::InvalidObject`] while the node is mutably borrowed.
    pub fn try_borrow(&self) -> Result<Ref<'_, Object>> {
        self.0
            .try_borrow()
            .map_err(|_| Error::invalid_object("object is still being read"))
    }

    #[must_use]
    pub fn type_name(&self) -> String {
        self.borrow().type_name()
    }

    // Accessors returning copies, for callers that only inspect values. A
    // node that is still being read yields `None`.

    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match &*self.try_borrow().ok()? {
            Object::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match &*self.try_borrow().ok()? {
            Object::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self.as_primitive()? {
            Primitive::Int(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_primitive_array(&self) -> Option<PrimitiveArray> {
        match &*self.try_borrow().ok()? {
            Object::Array(a) => Some(a.clone()),
            _ => None,
        }
    }

    /// Element `index` of an object array.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<ObjRef> {
        match &*self.try_borrow().ok()? {
            Object::Objects(a) => a.elements.get(index).cloned().flatten(),
            _ => None,
        }
    }

    /// Run `f` on the concrete custom type, if this node holds a `T`.
    pub fn with_custom<T: Serializable, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &*self.borrow() {
            Object::Custom(c) => c.as_any().downcast_ref::<T>().map(f),
            _ => None,
        }
    }

    pub fn with_custom_mut<T: Serializable, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        match &mut *self.borrow_mut() {
            Object::Custom(c) => c.as_any_mut().downcast_mut::<T>().map(f),
            _ => None,
        }
    }

    pub fn with_external<T: Externalizable, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &*self.borrow() {
            Object::External(e) => e.as_any().downcast_ref::<T>().map(f),
            _ => None,
        }
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never walk into the graph: it may be cyclic or borrowed.
        let type_name = match self.0.try_borrow() {
            Ok(object) => object.type_name(),
            Err(_) => "<borrowed>".to_string(),
        };
        f.debug_struct("ObjRef")
            .field("type", &type_name)
            .field("identity", &format_args!("{:#x}", self.identity()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PrimitiveKind;

    #[test]
    fn identity_follows_clones_not_values() {
        let a = ObjRef::string("x");
        let b = a.clone();
        let c = ObjRef::string("x");
        assert!(a.ptr_eq(&b));
        assert_eq!(a.identity(), b.identity());
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn type_names_of_builtins() {
        assert_eq!(ObjRef::int(1).type_name(), "Integer");
        assert_eq!(ObjRef::string("s").type_name(), "String");
        assert_eq!(ObjRef::class("demo.Node").type_name(), "Class");
        assert_eq!(
            ObjRef::array(PrimitiveArray::zeroed(PrimitiveKind::Double, 2)).type_name(),
            "double[]"
        );
        let grid = ObjRef::objects(ObjectArray::with_len("int[]", 3));
        assert_eq!(grid.type_name(), "int[][]");
        assert_eq!(ObjRef::enum_constant("demo.Color", "RED").type_name(), "demo.Color");
    }

    #[test]
    fn debug_does_not_follow_cycles() {
        let array = ObjRef::objects(ObjectArray::with_len("Object", 1));
        if let Object::Objects(a) = &mut *array.borrow_mut() {
            a.elements[0] = Some(array.clone());
        }
        let text = format!("{:?}", array);
        assert!(text.contains("Object[]"));
        // Break the cycle so the test does not leak.
        if let Object::Objects(a) = &mut *array.borrow_mut() {
            a.elements.clear();
        };
    }

    #[test]
    fn accessors() {
        assert_eq!(ObjRef::int(5).as_int(), Some(5));
        assert_eq!(ObjRef::string("a").as_int(), None);
        assert_eq!(ObjRef::string("a").as_string().as_deref(), Some("a"));
        let array = ObjRef::objects(ObjectArray::new("String", vec![Some(ObjRef::string("e")), None]));
        assert_eq!(array.element(0).and_then(|e| e.as_string()).as_deref(), Some("e"));
        assert!(array.element(1).is_none());
    }
}
