// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-stream counters, collected when `IoConfig::collect_stats` is set.

use std::collections::BTreeMap;
use std::fmt;

use crate::constants::PrimitiveKind;
use crate::types::names;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// New objects written or read.
    pub objects: u64,
    /// References resolved through an existing handle.
    pub back_references: u64,
    pub nulls: u64,
    /// Type names sent or received.
    pub type_names: u64,
    /// RESET and CLEAR control codes issued or seen.
    pub resets: u64,
    /// New objects per type name.
    pub per_type: BTreeMap<String, u64>,
    /// Primitive arrays per element kind: (arrays, total elements).
    pub arrays: BTreeMap<&'static str, (u64, u64)>,
}

impl StreamStats {
    pub(crate) fn record_object(&mut self, type_name: &str) {
        self.objects += 1;
        match self.per_type.get_mut(type_name) {
            Some(count) => *count += 1,
            None => {
                self.per_type.insert(type_name.to_string(), 1);
            }
        }
    }

    pub(crate) fn record_array(&mut self, kind: PrimitiveKind, len: usize) {
        let entry = self
            .arrays
            .entry(names::primitive_name(kind))
            .or_insert((0, 0));
        entry.0 += 1;
        entry.1 += len as u64;
    }
}

impl fmt::Display for StreamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "objects={} back_refs={} nulls={} type_names={} resets={}",
            self.objects, self.back_references, self.nulls, self.type_names, self.resets
        )?;
        for (name, count) in &self.per_type {
            writeln!(f, "  {:>8}  {}", count, name)?;
        }
        for (kind, (arrays, elements)) in &self.arrays {
            writeln!(f, "  {:>8}  {}[] ({} elements)", arrays, kind, elements)?;
        }
        Ok(())
    }
}
