// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object-graph reader.

use std::io::Read;
use std::sync::Arc;

use super::nesting::{Frame, NestingStack};
use super::slots::SlotTable;
use super::stats::StreamStats;
use super::type_table::ReadTypeTable;
use super::KnownHeader;
use crate::codec::{self, DataInput};
use crate::config::{self, IoConfig};
use crate::constants::{PrimitiveKind, CLEAR_HANDLE, NUL_HANDLE, RESET_HANDLE, TYPE_BIT, TYPE_MASK};
use crate::error::{Error, Result};
use crate::object::{ObjRef, Object, ObjectArray, Primitive, Value};
use crate::types::{names, registry, ArrayBase, ArrayShape, Strategy, TypeDescriptor};

pub struct ObjectInput {
    input: Box<dyn DataInput>,
    slots: SlotTable,
    types: ReadTypeTable,
    nesting: NestingStack,
    /// Objects whose fields are being read, with their type names. They
    /// are mutably borrowed until their strategy returns.
    in_progress: Vec<(ObjRef, Arc<str>)>,
    stats: Option<StreamStats>,
    closed: bool,
}

impl ObjectInput {
    /// Reader over `source` using the process-wide default configuration.
    pub fn new<R: Read + 'static>(source: R) -> Self {
        Self::with_config(source, &config::global())
    }

    pub fn with_config<R: Read + 'static>(source: R, config: &IoConfig) -> Self {
        Self::from_data_input(codec::open_input(Box::new(source), config), config)
    }

    pub fn from_data_input(input: Box<dyn DataInput>, config: &IoConfig) -> Self {
        log::debug!("[graph-in] opened: codec={}", input.codec());
        Self {
            input,
            slots: SlotTable::new(),
            types: ReadTypeTable::new(),
            nesting: NestingStack::default(),
            in_progress: Vec::new(),
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

    #[must_use]
    pub fn statistics(&self) -> Option<StreamStats> {
        self.stats.clone()
    }

    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.input.bytes_read()
    }

    /// Number of handles currently known.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of user type names received since the last CLEAR.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ---------------------------------------------------------------------
    // Primitives
    // ---------------------------------------------------------------------

    pub fn read_bool(&mut self) -> Result<bool> {
        self.ensure_open()?;
        self.input.read_bool()
    }

    pub fn read_byte(&mut self) -> Result<i8> {
        self.ensure_open()?;
        self.input.read_byte()
    }

    pub fn read_char(&mut self) -> Result<u16> {
        self.ensure_open()?;
        self.input.read_char()
    }

    pub fn read_short(&mut self) -> Result<i16> {
        self.ensure_open()?;
        self.input.read_short()
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.ensure_open()?;
        self.input.read_int()
    }

    pub fn read_long(&mut self) -> Result<i64> {
        self.ensure_open()?;
        self.input.read_long()
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.ensure_open()?;
        self.input.read_float()
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.ensure_open()?;
        self.input.read_double()
    }

    pub fn read_utf(&mut self) -> Result<Option<String>> {
        self.ensure_open()?;
        self.input.read_utf()
    }

    pub fn read_slice_bool(&mut self, dst: &mut [bool]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_bool(dst)
    }

    pub fn read_slice_byte(&mut self, dst: &mut [i8]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_byte(dst)
    }

    pub fn read_slice_char(&mut self, dst: &mut [u16]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_char(dst)
    }

    pub fn read_slice_short(&mut self, dst: &mut [i16]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_short(dst)
    }

    pub fn read_slice_int(&mut self, dst: &mut [i32]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_int(dst)
    }

    pub fn read_slice_long(&mut self, dst: &mut [i64]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_long(dst)
    }

    pub fn read_slice_float(&mut self, dst: &mut [f32]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_float(dst)
    }

    pub fn read_slice_double(&mut self, dst: &mut [f64]) -> Result<()> {
        self.ensure_open()?;
        self.input.read_array_double(dst)
    }

    // ---------------------------------------------------------------------
    // References
    // ---------------------------------------------------------------------

    /// Next handle or tagged type number, after applying control codes.
    fn read_handle(&mut self) -> Result<i32> {
        loop {
            let value = self.input.read_int()?;
            match value {
                RESET_HANDLE => {
                    log::trace!("[graph-in] RESET");
                    self.slots.clear();
                    self.count_reset();
                }
                CLEAR_HANDLE => {
                    log::trace!("[graph-in] CLEAR");
                    self.slots.clear();
                    self.types.clear();
                    self.count_reset();
                }
                _ => return Ok(value),
            }
        }
    }

    fn count_reset(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.resets += 1;
        }
    }

    pub fn read_object(&mut self) -> Result<Value> {
        self.ensure_open()?;
        let value = self.read_handle()?;
        if value == NUL_HANDLE {
            if let Some(stats) = self.stats.as_mut() {
                stats.nulls += 1;
            }
            return Ok(None);
        }
        if value & TYPE_BIT == 0 {
            let object = self.slots.get(value)?;
            if let Some(stats) = self.stats.as_mut() {
                stats.back_references += 1;
            }
            return Ok(Some(object));
        }
        self.read_new(value & TYPE_MASK, true).map(Some)
    }

    /// Counterpart of `write_object_unshared`: a back reference here is a
    /// protocol error, and the object can never be referenced later.
    pub fn read_object_unshared(&mut self) -> Result<Value> {
        self.ensure_open()?;
        let value = self.read_handle()?;
        if value == NUL_HANDLE {
            return Ok(None);
        }
        if value & TYPE_BIT == 0 {
            return Err(Error::invalid_object(format!(
                "unshared read got handle {} to an existing object",
                value
            )));
        }
        self.read_new(value & TYPE_MASK, false).map(Some)
    }

    /// Counterpart of `write_string`.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        match self.read_object()? {
            None => Ok(None),
            Some(object) => match &*object.try_borrow()? {
                Object::String(s) => Ok(Some(s.clone())),
                other => Err(Error::invalid_object(format!(
                    "expected a String, got {}",
                    other.type_name()
                ))),
            },
        }
    }

    /// Counterpart of `write_class`.
    pub fn read_class(&mut self) -> Result<Option<String>> {
        match self.read_object()? {
            None => Ok(None),
            Some(object) => match &*object.try_borrow()? {
                Object::Class(name) => Ok(Some(name.clone())),
                other => Err(Error::invalid_object(format!(
                    "expected a Class, got {}",
                    other.type_name()
                ))),
            },
        }
    }

    /// Counterpart of `write_known_object_header`.
    ///
    /// A new object's type reference is consumed here, so the type table
    /// stays in step with the writer's.
    pub fn read_known_type_header(&mut self) -> Result<KnownHeader> {
        self.ensure_open()?;
        let value = self.read_handle()?;
        if value == NUL_HANDLE {
            return Ok(KnownHeader::Null);
        }
        if value & TYPE_BIT == 0 {
            return Ok(KnownHeader::Existing(value));
        }
        let descriptor = self.read_type(value & TYPE_MASK)?;
        log::trace!("[graph-in] known header for new {}", descriptor.name());
        Ok(KnownHeader::New)
    }

    /// Counterpart of `write_known_array_header`.
    ///
    /// On [`KnownHeader::New`] the caller reads the length and elements and
    /// registers the array with [`add_object_to_cycle_check`](Self::add_object_to_cycle_check).
    pub fn read_known_array_header(&mut self, type_number: i32) -> Result<KnownHeader> {
        self.ensure_open()?;
        let value = self.read_handle()?;
        if value == NUL_HANDLE {
            return Ok(KnownHeader::Null);
        }
        if value & TYPE_BIT == 0 {
            return Ok(KnownHeader::Existing(value));
        }
        if value & TYPE_MASK != type_number {
            return Err(Error::corrupted(format!(
                "expected array type {} but got type {}",
                type_number,
                value & TYPE_MASK
            )));
        }
        Ok(KnownHeader::New)
    }

    /// Register an object created after [`KnownHeader::New`]; returns its
    /// handle.
    pub fn add_object_to_cycle_check(&mut self, object: &ObjRef) -> i32 {
        self.slots.push(object.clone())
    }

    /// Object behind a handle from [`KnownHeader::Existing`].
    pub fn get_object_from_cycle_check(&self, handle: i32) -> Result<ObjRef> {
        self.slots.get(handle)
    }

    fn read_type(&mut self, number: i32) -> Result<Arc<TypeDescriptor>> {
        let next = self.types.next();
        if number == 0 || number > next {
            return Err(Error::corrupted(format!(
                "type number {} out of range (next is {})",
                number, next
            )));
        }
        if number < next {
            return self.types.get(number);
        }
        let name = self
            .input
            .read_utf()?
            .ok_or_else(|| Error::corrupted("null type name"))?;
        let descriptor = registry().resolve(&name)?;
        log::trace!("[graph-in] type {} = {}", number, name);
        if let Some(stats) = self.stats.as_mut() {
            stats.type_names += 1;
        }
        self.types.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn read_new(&mut self, number: i32, shared: bool) -> Result<ObjRef> {
        let descriptor = self.read_type(number)?;
        if !descriptor.is_serializable() {
            return Err(Error::not_serializable(descriptor.name()));
        }
        let handle = if shared {
            self.slots.reserve()
        } else {
            self.slots.reserve_unshared()
        };
        log::trace!(
            "[graph-in] new {} handle={} shared={}",
            descriptor.name(),
            handle,
            shared
        );
        if let Some(stats) = self.stats.as_mut() {
            stats.record_object(descriptor.name());
        }
        let object = self.read_body(&descriptor, handle, shared)?;
        if shared {
            self.slots.bind(handle, object.clone());
        }
        Ok(object)
    }

    /// Bind before reading contents that may refer back to `object`.
    fn bind_early(&mut self, handle: i32, shared: bool, object: &ObjRef) {
        if shared {
            self.slots.bind(handle, object.clone());
        }
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = self.input.read_int()?;
        usize::try_from(len).map_err(|_| Error::corrupted(format!("negative array length {}", len)))
    }

    fn read_payload_utf(&mut self, what: &str) -> Result<String> {
        self.input
            .read_utf()?
            .ok_or_else(|| Error::corrupted(format!("null payload for {}", what)))
    }

    fn read_body(
        &mut self,
        descriptor: &TypeDescriptor,
        handle: i32,
        shared: bool,
    ) -> Result<ObjRef> {
        match descriptor.strategy() {
            Strategy::NotSerializable => Err(Error::not_serializable(descriptor.name())),
            Strategy::String => Ok(ObjRef::string(self.read_payload_utf(names::STRING)?)),
            Strategy::Class => {
                let name = self.read_payload_utf(names::CLASS)?;
                registry().resolve(&name)?;
                Ok(ObjRef::class(name))
            }
            Strategy::PrimitiveWrapper(kind) => {
                let value = match kind {
                    PrimitiveKind::Boolean => {
                        Primitive::Boolean(self.input.read_bool()?)
                    }
                    PrimitiveKind::Byte => Primitive::Byte(self.input.read_byte()?),
                    PrimitiveKind::Char => Primitive::Char(self.input.read_char()?),
                    PrimitiveKind::Short => {
                        Primitive::Short(self.input.read_short()?)
                    }
                    PrimitiveKind::Int => Primitive::Int(self.input.read_int()?),
                    PrimitiveKind::Long => Primitive::Long(self.input.read_long()?),
                    PrimitiveKind::Float => {
                        Primitive::Float(self.input.read_float()?)
                    }
                    PrimitiveKind::Double => {
                        Primitive::Double(self.input.read_double()?)
                    }
                };
                Ok(ObjRef::boxed(value))
            }
            Strategy::Enum(variants) => {
                let variant = self.read_payload_utf(descriptor.name())?;
                if !variants.iter().any(|v| *v == variant) {
                    return Err(Error::corrupted(format!(
                        "{} has no constant {}",
                        descriptor.name(),
                        variant
                    )));
                }
                Ok(ObjRef::enum_constant(descriptor.name(), variant))
            }
            Strategy::Array(shape) => match shape.primitive_kind() {
                Some(kind) => {
                    let len = self.read_len()?;
                    let values = self.input.read_primitive_array(kind, len)?;
                    if let Some(stats) = self.stats.as_mut() {
                        stats.record_array(kind, len);
                    }
                    Ok(ObjRef::array(values))
                }
                None => self.read_object_array(shape, handle, shared),
            },
            Strategy::Custom(support) => {
                let instance = support.instantiate().ok_or_else(|| {
                    Error::internal(format!("{} has no factory", descriptor.name()))
                })?;
                let object = ObjRef::new(Object::Custom(instance));
                self.bind_early(handle, shared, &object);
                self.in_progress.push((object.clone(), Arc::clone(&descriptor.name)));
                let mut result = Ok(());
                for level in 1..=descriptor.level() {
                    self.nesting.push(object.clone(), level);
                    result = match &mut *object.borrow_mut() {
                        Object::Custom(value) => value.read_fields(self, level),
                        _ => Err(Error::internal("custom object changed shape while reading")),
                    };
                    self.nesting.pop()?;
                    if result.is_err() {
                        break;
                    }
                }
                self.in_progress.pop();
                result.map(|()| object)
            }
            Strategy::Externalizable(support) => {
                let instance = support.instantiate_external().ok_or_else(|| {
                    Error::internal(format!("{} has no factory", descriptor.name()))
                })?;
                let object = ObjRef::new(Object::External(instance));
                self.bind_early(handle, shared, &object);
                self.in_progress.push((object.clone(), Arc::clone(&descriptor.name)));
                self.nesting.push(object.clone(), 0);
                let result = match &mut *object.borrow_mut() {
                    Object::External(value) => value.read_external(self),
                    _ => Err(Error::internal("external object changed shape while reading")),
                };
                self.nesting.pop()?;
                self.in_progress.pop();
                result.map(|()| object)
            }
        }
    }

    fn read_object_array(&mut self, shape: &ArrayShape, handle: i32, shared: bool) -> Result<ObjRef> {
        let len = self.read_len()?;
        let base_name: &str = match &shape.base {
            ArrayBase::Primitive(kind) => names::primitive_name(*kind),
            ArrayBase::Wrapper(kind) => names::wrapper_name(*kind),
            ArrayBase::String => names::STRING,
            ArrayBase::Class => names::CLASS,
            ArrayBase::Registered { name, .. } => name.as_ref(),
        };
        let element_type = names::array_name(base_name, shape.dimensions - 1);
        // Elements are appended as they arrive; the length is only trusted
        // as far as the input backs it.
        let mut array = match &shape.base {
            ArrayBase::Registered { allocator, .. } => allocator(&element_type, 0),
            _ => ObjectArray::with_len(element_type.as_str(), 0),
        };
        array.elements.clear();
        array.elements.reserve(len.min(codec::GROWTH_STEP));

        let object = ObjRef::objects(array);
        self.bind_early(handle, shared, &object);
        for _ in 0..len {
            let element = self.read_object()?;
            if let Some(element) = &element {
                let actual = self.type_name_of(element)?;
                if !registry().is_assignable(&actual, &element_type) {
                    return Err(Error::corrupted(format!(
                        "{} element in a {}[]",
                        actual, element_type
                    )));
                }
            }
            if let Object::Objects(array) = &mut *object.borrow_mut() {
                array.elements.push(element);
            }
        }
        Ok(object)
    }

    /// Wire type name of a value returned by `read_object`, including one
    /// whose fields are still being read.
    fn type_name_of(&self, object: &ObjRef) -> Result<String> {
        if let Ok(value) = object.try_borrow() {
            return Ok(value.type_name());
        }
        self.in_progress
            .iter()
            .rev()
            .find(|(pending, _)| pending.ptr_eq(object))
            .map(|(_, name)| name.to_string())
            .ok_or_else(|| Error::invalid_object("object is borrowed outside the reader"))
    }

    // ---------------------------------------------------------------------
    // Stream control
    // ---------------------------------------------------------------------

    /// Release the source. Later calls are no-ops; any other operation fails
    /// with [`Error::Closed`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.slots.clear();
        self.in_progress.clear();
        self.types.clear();
        self.nesting.clear();
        self.input.close();
        log::debug!("[graph-in] closed after {} bytes", self.input.bytes_read());
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

    /// Object whose fields are being read. It is mutably borrowed at that
    /// point: store the reference, do not borrow it.
    pub fn current_object(&self) -> Result<ObjRef> {
        Ok(self.nesting.current()?.object.clone())
    }

    pub fn current_level(&self) -> Result<u32> {
        Ok(self.nesting.current()?.level)
    }
}
