// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer-side handle table: object identity to handle number.

use std::collections::HashMap;

use crate::constants::CONTROL_HANDLES;
use crate::object::ObjRef;

/// Maps each object already written to the handle it was given.
///
/// The table holds a clone of every entry so that an object cannot be freed
/// (and its address reused by a new object) while its handle is live.
pub(crate) struct HandleTable {
    handles: HashMap<usize, i32>,
    keep: Vec<ObjRef>,
    next: i32,
}

impl HandleTable {
    pub(crate) fn new() -> Self {
        Self {
            handles: HashMap::new(),
            keep: Vec::new(),
            next: CONTROL_HANDLES,
        }
    }

    #[inline]
    pub(crate) fn lookup(&self, object: &ObjRef) -> Option<i32> {
        self.handles.get(&object.identity()).copied()
    }

    /// Give `object` the next handle.
    pub(crate) fn insert(&mut self, object: &ObjRef) -> i32 {
        let handle = self.next;
        self.next += 1;
        self.handles.insert(object.identity(), handle);
        self.keep.push(object.clone());
        handle
    }

    /// Consume a handle number without recording any object.
    pub(crate) fn skip(&mut self) -> i32 {
        let handle = self.next;
        self.next += 1;
        handle
    }

    /// Handle the next new object will get.
    #[inline]
    pub(crate) fn next(&self) -> i32 {
        self.next
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    pub(crate) fn clear(&mut self) {
        self.handles.clear();
        self.keep.clear();
        self.next = CONTROL_HANDLES;
    }
}
