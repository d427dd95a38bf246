// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stack of objects whose fields are being written or read.

use crate::error::{Error, Result};
use crate::object::ObjRef;

#[derive(Debug, Clone)]
pub struct Frame {
    pub object: ObjRef,
    pub level: u32,
}

#[derive(Debug, Default)]
pub(crate) struct NestingStack {
    frames: Vec<Frame>,
}

impl NestingStack {
    pub(crate) fn push(&mut self, object: ObjRef, level: u32) {
        self.frames.push(Frame { object, level });
    }

    pub(crate) fn pop(&mut self) -> Result<Frame> {
        self.frames.pop().ok_or(Error::NotActive)
    }

    pub(crate) fn current(&self) -> Result<&Frame> {
        self.frames.last().ok_or(Error::NotActive)
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_is_not_active() {
        let mut stack = NestingStack::default();
        assert!(matches!(stack.current(), Err(Error::NotActive)));
        assert!(matches!(stack.pop(), Err(Error::NotActive)));

        let outer = ObjRef::string("outer");
        stack.push(outer.clone(), 1);
        stack.push(ObjRef::string("inner"), 2);
        assert_eq!(stack.current().expect("active").level, 2);
        stack.pop().expect("pop inner");
        assert!(stack.current().expect("active").object.ptr_eq(&outer));
        assert_eq!(stack.depth(), 1);
    }
}
