// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire type names.
//!
//! Array types are the element type name followed by one `[]` per
//! dimension: `int[]`, `String[][]`, `demo.Node[]`.

use crate::constants::PrimitiveKind;

pub const STRING: &str = "String";
pub const CLASS: &str = "Class";

const ARRAY_SUFFIX: &str = "[]";

/// Name of the boxed wrapper of `kind`.
#[must_use]
pub const fn wrapper_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "Boolean",
        PrimitiveKind::Byte => "Byte",
        PrimitiveKind::Char => "Character",
        PrimitiveKind::Short => "Short",
        PrimitiveKind::Int => "Integer",
        PrimitiveKind::Long => "Long",
        PrimitiveKind::Float => "Float",
        PrimitiveKind::Double => "Double",
    }
}

#[must_use]
pub fn wrapper_kind(name: &str) -> Option<PrimitiveKind> {
    PrimitiveKind::ALL
        .into_iter()
        .find(|kind| wrapper_name(*kind) == name)
}

/// Name of the primitive itself (`int`, `double`, ...).
#[must_use]
pub const fn primitive_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "boolean",
        PrimitiveKind::Byte => "byte",
        PrimitiveKind::Char => "char",
        PrimitiveKind::Short => "short",
        PrimitiveKind::Int => "int",
        PrimitiveKind::Long => "long",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Double => "double",
    }
}

#[must_use]
pub fn primitive_kind(name: &str) -> Option<PrimitiveKind> {
    PrimitiveKind::ALL
        .into_iter()
        .find(|kind| primitive_name(*kind) == name)
}

#[must_use]
pub const fn primitive_array_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "boolean[]",
        PrimitiveKind::Byte => "byte[]",
        PrimitiveKind::Char => "char[]",
        PrimitiveKind::Short => "short[]",
        PrimitiveKind::Int => "int[]",
        PrimitiveKind::Long => "long[]",
        PrimitiveKind::Float => "float[]",
        PrimitiveKind::Double => "double[]",
    }
}

/// Split an array type name into its base element name and dimension count.
///
/// Returns `None` for non-array names and for malformed ones (empty base).
#[must_use]
pub fn split_array(name: &str) -> Option<(&str, usize)> {
    let mut base = name;
    let mut dimensions = 0;
    while let Some(inner) = base.strip_suffix(ARRAY_SUFFIX) {
        base = inner;
        dimensions += 1;
    }
    if dimensions == 0 || base.is_empty() || base.contains(['[', ']']) {
        return None;
    }
    Some((base, dimensions))
}

/// `base` followed by `dimensions` array suffixes.
#[must_use]
pub fn array_name(base: &str, dimensions: usize) -> String {
    let mut name = String::with_capacity(base.len() + 2 * dimensions);
    name.push_str(base);
    for _ in 0..dimensions {
        name.push_str(ARRAY_SUFFIX);
    }
    name
}

/// Names the registry answers without any registration.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    name == STRING
        || name == CLASS
        || wrapper_kind(name).is_some()
        || primitive_kind(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_and_primitives_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(wrapper_kind(wrapper_name(kind)), Some(kind));
            assert_eq!(primitive_kind(primitive_name(kind)), Some(kind));
            assert_eq!(
                split_array(primitive_array_name(kind)),
                Some((primitive_name(kind), 1))
            );
        }
        assert_eq!(wrapper_name(PrimitiveKind::Char), "Character");
    }

    #[test]
    fn array_names_split_by_dimension() {
        assert_eq!(split_array("demo.Node[][]"), Some(("demo.Node", 2)));
        assert_eq!(split_array("String[]"), Some(("String", 1)));
        assert_eq!(split_array("demo.Node"), None);
        assert_eq!(split_array("[]"), None);
        assert_eq!(split_array("a[]b[]"), None);
        assert_eq!(array_name("int", 3), "int[][][]");
    }

    #[test]
    fn builtin_names() {
        assert!(is_builtin("String"));
        assert!(is_builtin("Integer"));
        assert!(is_builtin("long"));
        assert!(!is_builtin("demo.Node"));
    }
}
