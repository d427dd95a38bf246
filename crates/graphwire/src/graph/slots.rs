// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reader-side handle table.
//!
//! A slot is reserved as soon as a new object is announced and bound once
//! the object exists, which for containers is before their contents are
//! read. Back references to a container from inside it therefore resolve.

use crate::constants::CONTROL_HANDLES;
use crate::error::{Error, Result};
use crate::object::ObjRef;

pub(crate) enum Slot {
    /// Announced, not constructed yet.
    Pending,
    Bound(ObjRef),
    /// Read with unshared semantics; may never be referenced.
    Unshared,
}

pub(crate) struct SlotTable {
    slots: Vec<Slot>,
}

impl SlotTable {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    #[inline]
    fn index(handle: i32) -> usize {
        (handle - CONTROL_HANDLES) as usize
    }

    /// Handle the next announced object will get.
    #[inline]
    pub(crate) fn next(&self) -> i32 {
        CONTROL_HANDLES + self.slots.len() as i32
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn reserve(&mut self) -> i32 {
        let handle = self.next();
        self.slots.push(Slot::Pending);
        handle
    }

    pub(crate) fn reserve_unshared(&mut self) -> i32 {
        let handle = self.next();
        self.slots.push(Slot::Unshared);
        handle
    }

    /// Reserve and bind in one step.
    pub(crate) fn push(&mut self, object: ObjRef) -> i32 {
        let handle = self.next();
        self.slots.push(Slot::Bound(object));
        handle
    }

    pub(crate) fn bind(&mut self, handle: i32, object: ObjRef) {
        if handle >= CONTROL_HANDLES {
            if let Some(slot) = self.slots.get_mut(Self::index(handle)) {
                *slot = Slot::Bound(object);
            }
        }
    }

    pub(crate) fn get(&self, handle: i32) -> Result<ObjRef> {
        if handle < CONTROL_HANDLES || handle >= self.next() {
            return Err(Error::corrupted(format!(
                "handle {} out of range (next is {})",
                handle,
                self.next()
            )));
        }
        match &self.slots[Self::index(handle)] {
            Slot::Bound(object) => Ok(object.clone()),
            Slot::Unshared => Err(Error::invalid_object(format!(
                "got handle {} to an unshared object",
                handle
            ))),
            Slot::Pending => Err(Error::invalid_object(format!(
                "handle {} refers to an object that is still being read",
                handle
            ))),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}
