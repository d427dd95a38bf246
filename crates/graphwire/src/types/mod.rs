// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors, dispatch strategies and the process-wide registry.
//!
//! Provides `TypeSupport` for registering user types, `TypeDescriptor` for
//! the per-type serialization metadata, and `TypeRegistry` for building and
//! caching descriptors on first use.

pub mod cache;
pub mod descriptor;
pub mod names;
pub mod strategy;
pub mod support;

pub use cache::{registry, LookupStats, TypeRegistry};
pub use descriptor::{FieldCounts, TypeDescriptor, TypeFlags};
pub use strategy::{ArrayBase, ArrayShape, Strategy};
pub use support::{ArrayAllocator, ExternalFactory, Factory, SupportKind, TypeSupport};
