// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object-graph writer.
//!
//! Every reference is written as one tagged integer:
//!
//! - `0` for null,
//! - the handle of an object already written,
//! - `TYPE_BIT | type number` for a new object, followed by the type name
//!   the first time the number is used, then the object's payload.
//!
//! New objects get handles implicitly, in write order, starting at 2. The
//! reader reproduces the numbering by counting.

use std::io::Write;

use super::handles::HandleTable;
use super::nesting::{Frame, NestingStack};
use super::stats::StreamStats;
use super::type_table::WriteTypeTable;
use super::KnownHeader;
use crate::codec::{self, DataOutput};
use crate::config::{self, IoConfig};
use crate::constants::{PrimitiveKind, CLEAR_HANDLE, CONTROL_HANDLES, NUL_HANDLE, RESET_HANDLE, TYPE_BIT};
use crate::error::{Error, Result};
use crate::object::{ObjRef, Object, Primitive, PrimitiveArray, Replacer, Value};
use crate::types::{registry, Strategy, TypeDescriptor};

pub struct ObjectOutput {
    out: Box<dyn DataOutput>,
    handles: HandleTable,
    types: WriteTypeTable,
    /// RESET or CLEAR code to emit before the next tagged integer.
    pending_control: Option<i32>,
    nesting: NestingStack,
    replacer: Option<Box<dyn Replacer>>,
    stats: Option<StreamStats>,
    closed: bool,
}

impl ObjectOutput {
    /// Writer over `sink` using the process-wide default configuration.
    pub fn new<W: Write + 'static>(sink: W) -> Self {
        Self::with_config(sink, &config::global())
    }

    pub fn with_config<W: Write + 'static>(sink: W, config: &IoConfig) -> Self {
        Self::from_data_output(codec::open_output(Box::new(sink), config), config)
    }

    /// Writer over an already built primitive layer.
    pub fn from_data_output(out: Box<dyn DataOutput>, config: &IoConfig) -> Self {
        log::debug!("[graph-out] opened: codec={}", out.codec());
        Self {
            out,
            handles: HandleTable::new(),
            types: WriteTypeTable::new(),
            pending_control: None,
            nesting: NestingStack::default(),
            replacer: None,
            stats: config.collect_stats.then(StreamStats::default),
            closed: false,
        }
    }

    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Install a hook consulted before each shared object is written.
    pub fn set_replacer(&mut self, replacer: Box<dyn Replacer>) {
        self.replacer = Some(replacer);
    }

    /// Snapshot of the counters, if statistics are enabled.
    #[must_use]
    pub fn statistics(&self) -> Option<StreamStats> {
        self.stats.clone()
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }

    /// Number of objects currently holding a handle.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    // ---------------------------------------------------------------------
    // Primitives
    // ---------------------------------------------------------------------

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.ensure_open()?;
        self.out.write_bool(value)
    }

    pub fn write_byte(&mut self, value: i8) -> Result<()> {
        self.ensure_open()?;
        self.out.write_byte(value)
    }

    pub fn write_char(&mut self, value: u16) -> Result<()> {
        self.ensure_open()?;
        self.out.write_char(value)
    }

    pub fn write_short(&mut self, value: i16) -> Result<()> {
        self.ensure_open()?;
        self.out.write_short(value)
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.ensure_open()?;
        self.out.write_int(value)
    }

    pub fn write_long(&mut self, value: i64) -> Result<()> {
        self.ensure_open()?;
        self.out.write_long(value)
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.ensure_open()?;
        self.out.write_float(value)
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.ensure_open()?;
        self.out.write_double(value)
    }

    /// A bare string value, without identity.
    pub fn write_utf(&mut self, value: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        self.out.write_utf(value)
    }

    pub fn write_slice_bool(&mut self, values: &[bool]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_bool(values)
    }

    pub fn write_slice_byte(&mut self, values: &[i8]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_byte(values)
    }

    pub fn write_slice_char(&mut self, values: &[u16]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_char(values)
    }

    pub fn write_slice_short(&mut self, values: &[i16]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_short(values)
    }

    pub fn write_slice_int(&mut self, values: &[i32]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_int(values)
    }

    pub fn write_slice_long(&mut self, values: &[i64]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_long(values)
    }

    pub fn write_slice_float(&mut self, values: &[f32]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_float(values)
    }

    pub fn write_slice_double(&mut self, values: &[f64]) -> Result<()> {
        self.ensure_open()?;
        self.out.write_array_double(values)
    }

    // ---------------------------------------------------------------------
    // References
    // ---------------------------------------------------------------------

    /// Write a reference, sending the object itself only the first time.
    pub fn write_object(&mut self, object: Option<&ObjRef>) -> Result<()> {
        self.ensure_open()?;
        let Some(object) = object else {
            return self.write_null();
        };
        let object = self.replace(object);
        if let Some(handle) = self.handles.lookup(&object) {
            log::trace!("[graph-out] back reference {}", handle);
            if let Some(stats) = self.stats.as_mut() {
                stats.back_references += 1;
            }
            return self.write_tagged(handle);
        }
        self.write_new(&object, true)
    }

    /// Write an object as new even if it was written before, without making
    /// it available to later back references.
    pub fn write_object_unshared(&mut self, object: Option<&ObjRef>) -> Result<()> {
        self.ensure_open()?;
        let Some(object) = object else {
            return self.write_null();
        };
        let object = self.replace(object);
        self.write_new(&object, false)
    }

    /// Write a string as a new `String` object.
    ///
    /// Strings passed by value have no identity, so repeated calls send the
    /// text again.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        match value {
            None => self.write_null(),
            Some(s) => self.write_new(&ObjRef::string(s), false),
        }
    }

    /// Write a class reference by type name. Like strings, each call sends
    /// the name again.
    pub fn write_class(&mut self, type_name: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        match type_name {
            None => self.write_null(),
            Some(name) => self.write_new(&ObjRef::class(name), false),
        }
    }

    /// Header for an object whose type the reader already knows.
    ///
    /// A new object is announced by its type reference, exactly as
    /// `write_object` would, so a generic reader can decode it. On
    /// [`KnownHeader::New`] the caller writes the object's contents and
    /// the reader must register the object with
    /// [`ObjectInput::add_object_to_cycle_check`](super::ObjectInput::add_object_to_cycle_check).
    pub fn write_known_object_header(&mut self, object: Option<&ObjRef>) -> Result<KnownHeader> {
        self.ensure_open()?;
        let Some(object) = object else {
            self.write_null()?;
            return Ok(KnownHeader::Null);
        };
        if let Some(handle) = self.handles.lookup(object) {
            self.write_tagged(handle)?;
            return Ok(KnownHeader::Existing(handle));
        }
        let type_name = object.type_name();
        let descriptor = registry().descriptor(&type_name)?;
        if !descriptor.is_serializable() {
            return Err(Error::not_serializable(type_name));
        }
        let handle = self.handles.insert(object);
        log::trace!("[graph-out] known header {} handle={}", type_name, handle);
        if let Some(stats) = self.stats.as_mut() {
            stats.record_object(&type_name);
        }
        self.write_type(&descriptor)?;
        Ok(KnownHeader::New)
    }

    /// Header for a primitive array of pre-bound type `type_number`.
    ///
    /// On [`KnownHeader::New`] the caller follows with the length
    /// (`write_int`) and the elements (`write_slice_*`); the reader decodes
    /// the result with `read_object`.
    pub fn write_known_array_header(
        &mut self,
        array: Option<&ObjRef>,
        type_number: i32,
    ) -> Result<KnownHeader> {
        self.ensure_open()?;
        if PrimitiveKind::from_type_number(type_number).is_none() {
            return Err(Error::invalid_object(format!(
                "type number {} is not a primitive array",
                type_number
            )));
        }
        let Some(array) = array else {
            self.write_null()?;
            return Ok(KnownHeader::Null);
        };
        if let Some(handle) = self.handles.lookup(array) {
            self.write_tagged(handle)?;
            return Ok(KnownHeader::Existing(handle));
        }
        self.handles.insert(array);
        self.write_tagged(type_number | TYPE_BIT)?;
        Ok(KnownHeader::New)
    }

    fn replace(&mut self, object: &ObjRef) -> ObjRef {
        match self.replacer.as_mut().and_then(|r| r.replace(object)) {
            Some(replacement) => {
                log::trace!("[graph-out] replaced {:?} with {:?}", object, replacement);
                replacement
            }
            None => object.clone(),
        }
    }

    fn write_null(&mut self) -> Result<()> {
        if let Some(stats) = self.stats.as_mut() {
            stats.nulls += 1;
        }
        self.write_tagged(NUL_HANDLE)
    }

    /// Emit a handle or tagged type number, preceded by any pending control.
    fn write_tagged(&mut self, value: i32) -> Result<()> {
        if let Some(control) = self.pending_control.take() {
            log::trace!("[graph-out] emit control {}", control);
            self.out.write_int(control)?;
        }
        self.out.write_int(value)
    }

    fn write_new(&mut self, object: &ObjRef, shared: bool) -> Result<()> {
        let type_name = object.type_name();
        let descriptor = registry().descriptor(&type_name)?;
        if !descriptor.is_serializable() {
            return Err(Error::not_serializable(type_name));
        }
        let handle = if shared {
            self.handles.insert(object)
        } else {
            self.handles.skip()
        };
        log::trace!(
            "[graph-out] new {} handle={} shared={}",
            type_name,
            handle,
            shared
        );
        if let Some(stats) = self.stats.as_mut() {
            stats.record_object(&type_name);
        }
        self.write_type(&descriptor)?;
        self.write_body(object, &descriptor)
    }

    fn write_type(&mut self, descriptor: &TypeDescriptor) -> Result<()> {
        let (number, first_use) = self.types.number(descriptor.name());
        self.write_tagged(number | TYPE_BIT)?;
        if first_use {
            if let Some(stats) = self.stats.as_mut() {
                stats.type_names += 1;
            }
            self.out.write_utf(Some(descriptor.name()))?;
        }
        Ok(())
    }

    fn write_body(&mut self, object: &ObjRef, descriptor: &TypeDescriptor) -> Result<()> {
        match descriptor.strategy() {
            Strategy::NotSerializable => Err(Error::not_serializable(descriptor.name())),
            Strategy::String => match &*object.borrow() {
                Object::String(s) => self.out.write_utf(Some(s)),
                _ => Err(mismatch(descriptor)),
            },
            Strategy::Class => match &*object.borrow() {
                Object::Class(name) => self.out.write_utf(Some(name)),
                _ => Err(mismatch(descriptor)),
            },
            Strategy::PrimitiveWrapper(_) => match &*object.borrow() {
                Object::Boxed(value) => self.write_primitive(*value),
                _ => Err(mismatch(descriptor)),
            },
            Strategy::Enum(variants) => match &*object.borrow() {
                Object::Enum(constant) => {
                    if !variants.iter().any(|v| *v == constant.variant) {
                        return Err(Error::invalid_object(format!(
                            "{} has no constant {}",
                            descriptor.name(),
                            constant.variant
                        )));
                    }
                    self.out.write_utf(Some(&constant.variant))
                }
                _ => Err(mismatch(descriptor)),
            },
            Strategy::Array(shape) => {
                if shape.primitive_kind().is_some() {
                    match &*object.borrow() {
                        Object::Array(values) => self.write_primitive_array(values),
                        _ => Err(mismatch(descriptor)),
                    }
                } else {
                    // Copy the references out so no borrow is held while
                    // the elements (possibly this array again) are written.
                    let elements: Vec<Value> = match &*object.borrow() {
                        Object::Objects(array) => array.elements.clone(),
                        _ => return Err(mismatch(descriptor)),
                    };
                    self.out.write_int(array_len(elements.len())?)?;
                    for element in &elements {
                        self.write_object(element.as_ref())?;
                    }
                    Ok(())
                }
            }
            Strategy::Custom(_) => {
                for level in 1..=descriptor.level() {
                    self.nesting.push(object.clone(), level);
                    let result = match &*object.borrow() {
                        Object::Custom(value) => value.write_fields(self, level),
                        _ => Err(mismatch(descriptor)),
                    };
                    self.nesting.pop()?;
                    result?;
                }
                Ok(())
            }
            Strategy::Externalizable(_) => {
                self.nesting.push(object.clone(), 0);
                let result = match &*object.borrow() {
                    Object::External(value) => value.write_external(self),
                    _ => Err(mismatch(descriptor)),
                };
                self.nesting.pop()?;
                result
            }
        }
    }

    fn write_primitive(&mut self, value: Primitive) -> Result<()> {
        match value {
            Primitive::Boolean(v) => self.out.write_bool(v),
            Primitive::Byte(v) => self.out.write_byte(v),
            Primitive::Char(v) => self.out.write_char(v),
            Primitive::Short(v) => self.out.write_short(v),
            Primitive::Int(v) => self.out.write_int(v),
            Primitive::Long(v) => self.out.write_long(v),
            Primitive::Float(v) => self.out.write_float(v),
            Primitive::Double(v) => self.out.write_double(v),
        }
    }

    fn write_primitive_array(&mut self, values: &PrimitiveArray) -> Result<()> {
        self.out.write_int(array_len(values.len())?)?;
        if let Some(stats) = self.stats.as_mut() {
            stats.record_array(values.kind(), values.len());
        }
        match values {
            PrimitiveArray::Boolean(v) => self.out.write_array_bool(v),
            PrimitiveArray::Byte(v) => self.out.write_array_byte(v),
            PrimitiveArray::Char(v) => self.out.write_array_char(v),
            PrimitiveArray::Short(v) => self.out.write_array_short(v),
            PrimitiveArray::Int(v) => self.out.write_array_int(v),
            PrimitiveArray::Long(v) => self.out.write_array_long(v),
            PrimitiveArray::Float(v) => self.out.write_array_float(v),
            PrimitiveArray::Double(v) => self.out.write_array_double(v),
        }
    }

    // ---------------------------------------------------------------------
    // Stream control
    // ---------------------------------------------------------------------

    /// Forget every handle; with `clear_types` forget type numbers too.
    ///
    /// The control code is sent lazily, in front of the next reference, so
    /// repeated resets cost nothing.
    pub fn reset(&mut self, clear_types: bool) -> Result<()> {
        self.ensure_open()?;
        if !clear_types && self.handles.next() == CONTROL_HANDLES {
            return Ok(());
        }
        self.handles.clear();
        if clear_types {
            self.types.clear();
            self.pending_control = Some(CLEAR_HANDLE);
        } else if self.pending_control != Some(CLEAR_HANDLE) {
            self.pending_control = Some(RESET_HANDLE);
        }
        if let Some(stats) = self.stats.as_mut() {
            stats.resets += 1;
        }
        log::debug!("[graph-out] reset clear_types={}", clear_types);
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.out.flush()
    }

    /// Flush and release the sink. Later calls are no-ops; any other
    /// operation fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.handles.clear();
        self.nesting.clear();
        log::debug!(
            "[graph-out] closed after {} bytes",
            self.out.bytes_written()
        );
        self.out.close()
    }

    // ---------------------------------------------------------------------
    // Nesting context
    // ---------------------------------------------------------------------

    pub fn push_current_object(&mut self, object: &ObjRef, level: u32) {
        self.nesting.push(object.clone(), level);
    }

    pub fn pop_current_object(&mut self) -> Result<Frame> {
        self.nesting.pop()
    }

    /// Object whose fields are being written.
    pub fn current_object(&self) -> Result<ObjRef> {
        Ok(self.nesting.current()?.object.clone())
    }

    pub fn current_level(&self) -> Result<u32> {
        Ok(self.nesting.current()?.level)
    }
}

impl Drop for ObjectOutput {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                log::warn!("[graph-out] close on drop failed: {}", e);
            }
        }
    }
}

fn mismatch(descriptor: &TypeDescriptor) -> Error {
    Error::invalid_object(format!(
        "object does not match the {} strategy of {}",
        descriptor.strategy().label(),
        descriptor.name()
    ))
}

fn array_len(len: usize) -> Result<i32> {
    i32::try_from(len)
        .map_err(|_| Error::invalid_object(format!("array of {} elements is too long", len)))
}
