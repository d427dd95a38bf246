// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-stream type numbering.
//!
//! Numbers 1..=8 are the primitive arrays on both ends and are never sent
//! by name. User types are numbered from 9 in order of first use; the name
//! travels once, right after the first occurrence of its number.

use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::{PrimitiveKind, PRIMITIVE_TYPES};
use crate::error::{Error, Result};
use crate::types::{names, registry, TypeDescriptor};

/// Writer side: name to number.
pub(crate) struct WriteTypeTable {
    numbers: HashMap<String, i32>,
    next: i32,
    /// Last name looked up and its number.
    last: Option<(String, i32)>,
}

impl WriteTypeTable {
    pub(crate) fn new() -> Self {
        let mut table = Self {
            numbers: HashMap::new(),
            next: PRIMITIVE_TYPES,
            last: None,
        };
        table.bind_primitives();
        table
    }

    fn bind_primitives(&mut self) {
        for kind in PrimitiveKind::ALL {
            self.numbers.insert(
                names::primitive_array_name(kind).to_string(),
                kind.type_number(),
            );
        }
    }

    /// Number for `name`, and whether it was just assigned (so the name must
    /// be sent).
    pub(crate) fn number(&mut self, name: &str) -> (i32, bool) {
        if let Some((last, number)) = &self.last {
            if last == name {
                return (*number, false);
            }
        }
        let (number, first_use) = match self.numbers.get(name) {
            Some(number) => (*number, false),
            None => {
                let number = self.next;
                self.next += 1;
                self.numbers.insert(name.to_string(), number);
                (number, true)
            }
        };
        self.last = Some((name.to_string(), number));
        (number, first_use)
    }

    /// User types currently numbered.
    pub(crate) fn len(&self) -> usize {
        (self.next - PRIMITIVE_TYPES) as usize
    }

    pub(crate) fn clear(&mut self) {
        self.numbers.clear();
        self.next = PRIMITIVE_TYPES;
        self.last = None;
        self.bind_primitives();
    }
}

/// Reader side: number to descriptor.
pub(crate) struct ReadTypeTable {
    types: Vec<Arc<TypeDescriptor>>,
}

impl ReadTypeTable {
    pub(crate) fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Number the next unseen name will get.
    #[inline]
    pub(crate) fn next(&self) -> i32 {
        PRIMITIVE_TYPES + self.types.len() as i32
    }

    /// Descriptor of an already known number.
    pub(crate) fn get(&self, number: i32) -> Result<Arc<TypeDescriptor>> {
        if let Some(kind) = PrimitiveKind::from_type_number(number) {
            return registry().resolve(names::primitive_array_name(kind));
        }
        if number < PRIMITIVE_TYPES || number >= self.next() {
            return Err(Error::corrupted(format!(
                "type number {} out of range (next is {})",
                number,
                self.next()
            )));
        }
        Ok(Arc::clone(&self.types[(number - PRIMITIVE_TYPES) as usize]))
    }

    pub(crate) fn push(&mut self, descriptor: Arc<TypeDescriptor>) -> i32 {
        let number = self.next();
        self.types.push(descriptor);
        number
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    pub(crate) fn clear(&mut self) {
        self.types.clear();
    }
}
