// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide registry of type descriptors.
//!
//! Descriptors are built lazily, on the first lookup of a name, and cached
//! forever: every stream in the process sees the same `Arc<TypeDescriptor>`
//! for a given name. Reads are served under a shared lock. A miss builds the
//! descriptor outside any lock (building may recurse into super types and
//! array bases) and then inserts it under the write lock; if another thread
//! won the race its descriptor is kept and ours is dropped.
//!
//! Nothing is ever evicted: a stream's type table holds descriptors by
//! number and relies on there being exactly one per name.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::descriptor::{TypeDescriptor, TypeFlags};
use super::names;
use super::strategy::{ArrayBase, ArrayShape, Strategy};
use super::support::{SupportKind, TypeSupport};
use crate::error::{Error, Result};

/// Longest super-type chain followed before giving up.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// Registry lookup statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    /// Descriptors built and inserted.
    pub created: u64,
}

pub struct TypeRegistry {
    supports: DashMap<Arc<str>, Arc<TypeSupport>>,
    descriptors: RwLock<HashMap<Arc<str>, Arc<TypeDescriptor>>>,
    stats: RwLock<LookupStats>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            supports: DashMap::new(),
            descriptors: RwLock::new(HashMap::new()),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// Register a user type. The first registration of a name wins; later
    /// ones are ignored and return `Ok(false)`.
    pub fn register(&self, support: TypeSupport) -> Result<bool> {
        let name = support.name();
        if name.is_empty() || names::is_builtin(name) || name.contains(['[', ']']) {
            return Err(Error::Registration {
                reason: format!("'{}' cannot be registered as a user type", name),
            });
        }
        match self.supports.entry(support.name_arc()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                log::debug!("[registry] {} already registered, keeping the first", name);
                Ok(false)
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                log::debug!("[registry] registered {:?}", support);
                slot.insert(Arc::new(support));
                Ok(true)
            }
        }
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.supports.contains_key(name)
    }

    #[must_use]
    pub fn support(&self, name: &str) -> Option<Arc<TypeSupport>> {
        self.supports.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Writer-side lookup. An unknown name yields an uncached descriptor with
    /// the unsupported strategy, so writing it fails with `NotSerializable`.
    pub fn descriptor(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        match self.lookup(name, 0)? {
            Some(descriptor) => Ok(descriptor),
            None => Ok(Arc::new(TypeDescriptor::unsupported(name))),
        }
    }

    /// Reader-side lookup of a name received on the wire.
    pub fn resolve(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        self.lookup(name, 0)?
            .ok_or_else(|| Error::class_not_found(name))
    }

    /// True when a value of type `actual` may sit in a slot declared as
    /// `expected`: same type, a subtype through the registered super chain,
    /// or an array of such with the same dimensions.
    #[must_use]
    pub fn is_assignable(&self, actual: &str, expected: &str) -> bool {
        if actual == expected {
            return true;
        }
        let (actual_base, expected_base) =
            match (names::split_array(actual), names::split_array(expected)) {
                (Some((a, a_dims)), Some((e, e_dims))) if a_dims == e_dims => (a, e),
                (None, None) => (actual, expected),
                _ => return false,
            };
        let Ok(descriptor) = self.descriptor(actual_base) else {
            return false;
        };
        let mut current = descriptor.super_descriptor();
        while let Some(parent) = current {
            if parent.name() == expected_base {
                return true;
            }
            current = parent.super_descriptor();
        }
        false
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &str, depth: usize) -> Result<Option<Arc<TypeDescriptor>>> {
        if let Some(hit) = self.try_peek(name) {
            self.record_hit();
            return Ok(Some(hit));
        }
        if depth > MAX_INHERITANCE_DEPTH {
            return Err(Error::Registration {
                reason: format!(
                    "super type chain of {} exceeds {} levels (cycle?)",
                    name, MAX_INHERITANCE_DEPTH
                ),
            });
        }

        let Some(built) = self.build(name, depth)? else {
            self.record_miss();
            return Ok(None);
        };

        let mut cache = self.descriptors.write();
        if let Some(existing) = cache.get(name) {
            self.record_hit();
            return Ok(Some(Arc::clone(existing)));
        }
        let built = Arc::new(built);
        cache.insert(Arc::clone(&built.name), Arc::clone(&built));
        drop(cache);

        log::debug!("[registry] created {:?}", built);
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.created = stats.created.saturating_add(1);
        Ok(Some(built))
    }

    fn try_peek(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.descriptors.read().get(name).map(Arc::clone)
    }

    /// Build the descriptor for `name`, or `None` when the name is unknown.
    fn build(&self, name: &str, depth: usize) -> Result<Option<TypeDescriptor>> {
        let key: Arc<str> = Arc::from(name);

        if let Some((base, dimensions)) = names::split_array(name) {
            return Ok(match self.array_base(base) {
                Some(base) => Some(TypeDescriptor::new(
                    key,
                    TypeFlags::ARRAY,
                    Strategy::Array(ArrayShape { dimensions, base }),
                )),
                // Registered, but arrays of it cannot be allocated.
                None if self.is_registered(base) => Some(TypeDescriptor::unsupported(name)),
                None => None,
            });
        }

        if name == names::STRING {
            return Ok(Some(TypeDescriptor::new(key, TypeFlags::STRING, Strategy::String)));
        }
        if name == names::CLASS {
            return Ok(Some(TypeDescriptor::new(key, TypeFlags::CLASS, Strategy::Class)));
        }
        if let Some(kind) = names::wrapper_kind(name) {
            return Ok(Some(TypeDescriptor::new(
                key,
                TypeFlags::WRAPPER,
                Strategy::PrimitiveWrapper(kind),
            )));
        }
        if names::primitive_kind(name).is_some() {
            // Valid as a class name, never as an object.
            return Ok(Some(TypeDescriptor::unsupported(name)));
        }

        let Some(support) = self.support(name) else {
            return Ok(None);
        };
        let mut descriptor = match support.kind() {
            SupportKind::Serializable(_) => {
                let mut descriptor = TypeDescriptor::new(
                    key,
                    TypeFlags::CUSTOM,
                    Strategy::Custom(Arc::clone(&support)),
                );
                descriptor.level = 1;
                if let Some(super_name) = support.super_type() {
                    let parent = self
                        .lookup(super_name, depth + 1)?
                        .ok_or_else(|| Error::class_not_found(super_name))?;
                    if !matches!(parent.strategy(), Strategy::Custom(_)) {
                        return Err(Error::Registration {
                            reason: format!(
                                "super type {} of {} is not a custom serializable type",
                                super_name, name
                            ),
                        });
                    }
                    descriptor.level = parent.level() + 1;
                    descriptor.super_descriptor = Some(parent);
                }
                descriptor
            }
            SupportKind::Externalizable(_) => TypeDescriptor::new(
                key,
                TypeFlags::EXTERNALIZABLE,
                Strategy::Externalizable(Arc::clone(&support)),
            ),
            SupportKind::Enumeration(variants) => TypeDescriptor::new(
                key,
                TypeFlags::ENUM,
                Strategy::Enum(Arc::clone(variants)),
            ),
            SupportKind::Opaque => TypeDescriptor::unsupported(name),
        };
        descriptor.fields = support.fields();
        Ok(Some(descriptor))
    }

    /// Base of an array type; `None` for unknown names and for registered
    /// types without an array allocator.
    fn array_base(&self, base: &str) -> Option<ArrayBase> {
        if let Some(kind) = names::primitive_kind(base) {
            return Some(ArrayBase::Primitive(kind));
        }
        if let Some(kind) = names::wrapper_kind(base) {
            return Some(ArrayBase::Wrapper(kind));
        }
        if base == names::STRING {
            return Some(ArrayBase::String);
        }
        if base == names::CLASS {
            return Some(ArrayBase::Class);
        }
        let support = self.support(base)?;
        support.array_allocator().map(|allocator| ArrayBase::Registered {
            name: support.name_arc(),
            allocator,
        })
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
    }
}

static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// The registry shared by every stream in the process.
pub fn registry() -> &'static TypeRegistry {
    REGISTRY.get_or_init(TypeRegistry::new)
}

#[cfg(test)]
mod tests;
