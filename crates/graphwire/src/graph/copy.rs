// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::io::Cursor;

use super::{ObjectInput, ObjectOutput};
use crate::buffer::MemorySink;
use crate::config;
use crate::error::{Error, Result};
use crate::object::ObjRef;

/// Copy a graph by writing it to memory and reading it back.
///
/// Sharing and cycles inside the graph are preserved; nothing in the copy is
/// shared with the original.
pub fn deep_copy(object: &ObjRef) -> Result<ObjRef> {
    let config = config::global();
    let sink = MemorySink::new();
    let mut out = ObjectOutput::with_config(sink.clone(), &config);
    out.write_object(Some(object))?;
    out.close()?;

    let mut input = ObjectInput::with_config(Cursor::new(sink.take()), &config);
    let copy = input.read_object()?;
    input.close();
    copy.ok_or_else(|| Error::internal("deep copy produced null"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Object, ObjectArray, PrimitiveArray};

    #[test]
    fn copy_is_detached_from_original() {
        let original = ObjRef::array(PrimitiveArray::Int(vec![1, 2, 3]));
        let copy = deep_copy(&original).expect("copy");
        assert!(!copy.ptr_eq(&original));

        if let Object::Array(PrimitiveArray::Int(values)) = &mut *copy.borrow_mut() {
            values[0] = 99;
        }
        match &*original.borrow() {
            Object::Array(PrimitiveArray::Int(values)) => assert_eq!(values[0], 1),
            other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn copy_keeps_sharing() {
        let shared = ObjRef::string("twice");
        let array = ObjRef::objects(ObjectArray::with_len("String", 2));
        if let Object::Objects(inner) = &mut *array.borrow_mut() {
            inner.elements[0] = Some(shared.clone());
            inner.elements[1] = Some(shared.clone());
        }
        let copy = deep_copy(&array).expect("copy");
        let first = copy.element(0).expect("element");
        let second = copy.element(1).expect("element");
        assert!(first.ptr_eq(&second));
        assert!(!first.ptr_eq(&shared));
        assert_eq!(first.as_string().as_deref(), Some("twice"));
    }
}
