// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//! Tests for TypeRegistry.

use super::*;
use crate::constants::PrimitiveKind;
use crate::graph::{ObjectInput, ObjectOutput};
use crate::object::Serializable;
use std::any::Any;
use std::sync::Barrier;
use std::thread;

#[derive(Default)]
struct Empty;

impl Serializable for Empty {
    fn type_name(&self) -> &str {
        "test.Empty"
    }

    fn write_fields(&self, _out: &mut ObjectOutput, _level: u32) -> Result<()> {
        Ok(())
    }

    fn read_fields(&mut self, _input: &mut ObjectInput, _level: u32) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn empty() -> Box<dyn Serializable> {
    Box::new(Empty)
}

#[test]
fn builtins_resolve_without_registration() {
    let registry = TypeRegistry::new();
    let string = registry.resolve("String").expect("String is built in");
    assert!(matches!(string.strategy(), Strategy::String));

    let integer = registry.resolve("Integer").expect("Integer is built in");
    assert!(matches!(
        integer.strategy(),
        Strategy::PrimitiveWrapper(PrimitiveKind::Int)
    ));

    let grid = registry.resolve("double[][]").expect("primitive arrays are built in");
    match grid.strategy() {
        Strategy::Array(shape) => {
            assert_eq!(shape.dimensions, 2);
            assert!(shape.primitive_kind().is_none());
        }
        other => panic!("unexpected strategy {:?}", other),
    }

    let bare = registry.resolve("int").expect("primitive names are valid class names");
    assert!(!bare.is_serializable());
}

#[test]
fn unknown_names_differ_by_direction() {
    let registry = TypeRegistry::new();
    assert!(matches!(
        registry.resolve("demo.Missing"),
        Err(Error::ClassNotFound { .. })
    ));
    let written = registry.descriptor("demo.Missing").expect("writer lookup never fails");
    assert!(!written.is_serializable());
    // Unknown names are not cached.
    assert!(registry.is_empty());
}

#[test]
fn lookups_return_one_descriptor_per_name() {
    let registry = TypeRegistry::new();
    let first = registry.resolve("String[]").expect("built in");
    let second = registry.descriptor("String[]").expect("built in");
    assert!(Arc::ptr_eq(&first, &second));

    let stats = registry.stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn registration_rules() {
    let registry = TypeRegistry::new();
    assert!(registry
        .register(TypeSupport::serializable("test.Empty", empty))
        .expect("first registration"));
    assert!(!registry
        .register(TypeSupport::opaque("test.Empty"))
        .expect("duplicate is ignored"));
    assert!(matches!(
        registry.support("test.Empty").map(|s| s.kind().clone()),
        Some(SupportKind::Serializable(_))
    ));

    for bad in ["String", "Integer", "int", "test.Empty[]", ""] {
        assert!(
            matches!(
                registry.register(TypeSupport::opaque(bad)),
                Err(Error::Registration { .. })
            ),
            "{:?} must be rejected",
            bad
        );
    }
}

#[test]
fn super_types_set_the_level() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeSupport::serializable("test.Base", empty))
        .expect("register base");
    registry
        .register(TypeSupport::serializable("test.Middle", empty).with_super("test.Base"))
        .expect("register middle");
    registry
        .register(TypeSupport::serializable("test.Leaf", empty).with_super("test.Middle"))
        .expect("register leaf");

    let leaf = registry.resolve("test.Leaf").expect("resolves");
    assert_eq!(leaf.level(), 3);
    let middle = leaf.super_descriptor().expect("has a super type");
    assert_eq!(middle.name(), "test.Middle");
    // The parent is the cached descriptor, not a private copy.
    let cached = registry.resolve("test.Middle").expect("resolves");
    assert!(Arc::ptr_eq(middle, &cached));
}

#[test]
fn subtypes_fit_slots_of_their_super_types() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeSupport::serializable("test.Animal", empty))
        .expect("register animal");
    registry
        .register(TypeSupport::serializable("test.Dog", empty).with_super("test.Animal"))
        .expect("register dog");
    registry
        .register(TypeSupport::serializable("test.Puppy", empty).with_super("test.Dog"))
        .expect("register puppy");

    assert!(registry.is_assignable("test.Puppy", "test.Animal"));
    assert!(registry.is_assignable("test.Dog", "test.Dog"));
    assert!(!registry.is_assignable("test.Animal", "test.Dog"));
    assert!(registry.is_assignable("test.Puppy[]", "test.Animal[]"));
    assert!(!registry.is_assignable("test.Puppy[][]", "test.Animal[]"));
    assert!(!registry.is_assignable("int[]", "test.Animal"));
    assert!(!registry.is_assignable("String", "Integer"));
    assert!(!registry.is_assignable("test.Unknown", "test.Animal"));
}

#[test]
fn broken_super_chains_are_reported() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeSupport::serializable("test.Orphan", empty).with_super("test.Gone"))
        .expect("register");
    assert!(matches!(
        registry.resolve("test.Orphan"),
        Err(Error::ClassNotFound { .. })
    ));

    registry
        .register(TypeSupport::serializable("test.A", empty).with_super("test.B"))
        .expect("register");
    registry
        .register(TypeSupport::serializable("test.B", empty).with_super("test.A"))
        .expect("register");
    assert!(matches!(
        registry.resolve("test.A"),
        Err(Error::Registration { .. })
    ));

    registry
        .register(TypeSupport::enumeration("test.Color", ["RED"]))
        .expect("register");
    registry
        .register(TypeSupport::serializable("test.Paint", empty).with_super("test.Color"))
        .expect("register");
    assert!(matches!(
        registry.resolve("test.Paint"),
        Err(Error::Registration { .. })
    ));
}

#[test]
fn arrays_of_user_types_need_an_allocator() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeSupport::serializable("test.Plain", empty))
        .expect("register");
    registry
        .register(TypeSupport::serializable("test.Listed", empty).with_arrays())
        .expect("register");

    let plain = registry.resolve("test.Plain[]").expect("known base");
    assert!(!plain.is_serializable());

    let listed = registry.resolve("test.Listed[][]").expect("known base");
    match listed.strategy() {
        Strategy::Array(ArrayShape {
            dimensions: 2,
            base: ArrayBase::Registered { name, .. },
        }) => assert_eq!(&**name, "test.Listed"),
        other => panic!("unexpected strategy {:?}", other),
    }

    assert!(matches!(
        registry.resolve("test.Nowhere[]"),
        Err(Error::ClassNotFound { .. })
    ));
}

#[test]
fn concurrent_first_use_builds_one_descriptor() {
    let registry = Arc::new(TypeRegistry::new());
    registry
        .register(TypeSupport::serializable("test.Shared", empty))
        .expect("register");

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.resolve("test.Shared").expect("resolves")
            })
        })
        .collect();

    let results: Vec<Arc<TypeDescriptor>> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic"))
        .collect();
    for descriptor in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], descriptor));
    }
    assert_eq!(registry.stats().created, 1);
}
