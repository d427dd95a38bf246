// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contracts implemented by user types.

use std::any::Any;

use super::ObjRef;
use crate::error::Result;
use crate::graph::{ObjectInput, ObjectOutput};

/// A type that writes and reads its own fields, one inheritance level at a
/// time.
///
/// Level 1 is the outermost registered ancestor; the concrete type is at
/// `TypeDescriptor::level()`. The stream calls `write_fields` and
/// `read_fields` once per level in ascending order, so each level handles
/// exactly the fields it declares.
///
/// While `read_fields` runs the object is mutably borrowed. Back references
/// to it (through `read_object` or `current_object`) can be stored but not
/// borrowed until the call returns.
pub trait Serializable: Any {
    /// Registered name of the concrete type.
    fn type_name(&self) -> &str;

    fn write_fields(&self, out: &mut ObjectOutput, level: u32) -> Result<()>;

    fn read_fields(&mut self, input: &mut ObjectInput, level: u32) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A type that owns its whole wire form.
///
/// No per-level dispatch: the stream calls each method once.
pub trait Externalizable: Any {
    fn type_name(&self) -> &str;

    fn write_external(&self, out: &mut ObjectOutput) -> Result<()>;

    fn read_external(&mut self, input: &mut ObjectInput) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Write-side hook that may substitute an object before it is serialized.
///
/// Returning `None` keeps the original. Handle lookup and assignment use the
/// object returned here, so a replacer that hands back the same replacement
/// for the same original preserves sharing.
pub trait Replacer {
    fn replace(&mut self, object: &ObjRef) -> Option<ObjRef>;
}
