// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The object layer over the Hessian-compatible codec.

use std::io::Cursor;

use graphwire::{
    Codec, Error, IoConfig, MemorySink, ObjRef, ObjectArray, ObjectInput, ObjectOutput, Primitive,
    PrimitiveArray,
};

fn hessian() -> IoConfig {
    IoConfig::default().with_codec(Codec::Hessian)
}

fn write_with(config: &IoConfig, f: impl FnOnce(&mut ObjectOutput)) -> Vec<u8> {
    let sink = MemorySink::new();
    let mut out = ObjectOutput::with_config(sink.clone(), config);
    f(&mut out);
    out.close().expect("close");
    sink.take()
}

#[test]
fn integer_string_backref_null_scenario() {
    let bytes = write_with(&hessian(), |out| {
        let answer = ObjRef::int(42);
        out.write_object(Some(&answer)).expect("42");
        out.write_object(Some(&ObjRef::string("hi"))).expect("hi");
        out.write_object(Some(&answer)).expect("same 42");
        out.write_object(None).expect("null");
    });

    let mut expected = vec![b'I', 0x80, 0x00, 0x00, 0x09, 0x07];
    expected.extend_from_slice(b"Integer");
    expected.push(0x90 + 42);
    expected.extend_from_slice(&[b'I', 0x80, 0x00, 0x00, 0x0a, 0x06]);
    expected.extend_from_slice(b"String");
    expected.push(0x02);
    expected.extend_from_slice(b"hi");
    expected.extend_from_slice(&[0x92, 0x90]);
    assert_eq!(bytes, expected);

    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    let first = input.read_object().expect("read").expect("42");
    assert_eq!(first.as_int(), Some(42));
    assert_eq!(
        input.read_object().expect("read").and_then(|s| s.as_string()).as_deref(),
        Some("hi")
    );
    assert!(input.read_object().expect("read").expect("same").ptr_eq(&first));
    assert!(input.read_object().expect("read").is_none());
}

#[test]
fn integer_tiers_on_the_wire() {
    let cases: [(i32, &[u8]); 6] = [
        (-16, &[0x80]),
        (47, &[0xbf]),
        (-17, &[0xc7, 0xef]),
        (2047, &[0xcf, 0xff]),
        (2048, &[0xd4, 0x08, 0x00]),
        (100_000, &[0xd5, 0x86, 0xa0]),
    ];
    for (value, encoded) in cases {
        let bytes = write_with(&hessian(), |out| out.write_int(value).expect("int"));
        assert_eq!(bytes, encoded, "encoding of {}", value);
        let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
        assert_eq!(input.read_int().expect("int"), value);
    }
}

#[test]
fn scalar_kinds_round_trip() {
    let bytes = write_with(&hessian(), |out| {
        out.write_bool(true).expect("bool");
        out.write_byte(-5).expect("byte");
        out.write_short(-30_000).expect("short");
        out.write_char(0x20ac).expect("char");
        out.write_long(-300_000).expect("long");
        out.write_long(i64::MIN).expect("long");
        out.write_float(0.5).expect("float");
        out.write_double(1.0e300).expect("double");
        out.write_double(-0.0).expect("negative zero");
        out.write_utf(None).expect("null utf");
    });

    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    assert!(input.read_bool().expect("bool"));
    assert_eq!(input.read_byte().expect("byte"), -5);
    assert_eq!(input.read_short().expect("short"), -30_000);
    assert_eq!(input.read_char().expect("char"), 0x20ac);
    assert_eq!(input.read_long().expect("long"), -300_000);
    assert_eq!(input.read_long().expect("long"), i64::MIN);
    assert_eq!(input.read_float().expect("float"), 0.5);
    assert_eq!(input.read_double().expect("double"), 1.0e300);
    assert!(input.read_double().expect("negative zero").is_sign_negative());
    assert_eq!(input.read_utf().expect("null utf"), None);
}

#[test]
fn long_strings_are_chunked() {
    let text: String = std::iter::repeat('x').take(70_000).collect();
    let bytes = write_with(&hessian(), |out| out.write_utf(Some(&text)).expect("utf"));

    assert_eq!(&bytes[..3], &[b's', 0xff, 0xff]);
    let final_at = 3 + 65_535;
    assert_eq!(bytes[final_at], b'S');
    assert_eq!(
        u16::from_be_bytes([bytes[final_at + 1], bytes[final_at + 2]]),
        (70_000u32 - 65_535) as u16
    );

    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    assert_eq!(input.read_utf().expect("utf").as_deref(), Some(text.as_str()));
}

#[test]
fn graphs_round_trip() {
    let shared = ObjRef::string("shared");
    let graph = ObjRef::objects(ObjectArray::new(
        "String",
        vec![Some(shared.clone()), Some(ObjRef::string("é€")), Some(shared)],
    ));
    let numbers = ObjRef::array(PrimitiveArray::Double(vec![0.0, 1.0, -2.0, 0.1]));
    let bytes_array = ObjRef::array(PrimitiveArray::Byte((0..40).collect()));

    let bytes = write_with(&hessian(), |out| {
        out.write_object(Some(&graph)).expect("graph");
        out.write_object(Some(&numbers)).expect("numbers");
        out.write_object(Some(&bytes_array)).expect("bytes");
        out.write_object(Some(&ObjRef::boxed(Primitive::Long(1 << 40))))
            .expect("long");
    });

    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    let graph = input.read_object().expect("read").expect("graph");
    let first = graph.element(0).expect("first");
    assert!(first.ptr_eq(&graph.element(2).expect("third")));
    assert_eq!(
        graph.element(1).and_then(|e| e.as_string()).as_deref(),
        Some("é€")
    );
    assert_eq!(
        input.read_object().expect("read").and_then(|a| a.as_primitive_array()),
        Some(PrimitiveArray::Double(vec![0.0, 1.0, -2.0, 0.1]))
    );
    assert_eq!(
        input.read_object().expect("read").and_then(|a| a.as_primitive_array()),
        Some(PrimitiveArray::Byte((0..40).collect()))
    );
    assert_eq!(
        input.read_object().expect("read").and_then(|l| l.as_primitive()),
        Some(Primitive::Long(1 << 40))
    );
}

#[test]
fn unexpected_double_tag_is_corruption() {
    let mut input = ObjectInput::with_config(Cursor::new(vec![b'X']), &hessian());
    match input.read_double() {
        Err(Error::StreamCorrupted { reason }) => {
            assert_eq!(reason, "expected double but got tag 0x58");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn out_of_range_short_is_corruption() {
    let bytes = write_with(&hessian(), |out| out.write_int(70_000).expect("int"));
    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    assert!(matches!(input.read_short(), Err(Error::StreamCorrupted { .. })));
}

#[test]
fn byte_arrays_spanning_chunks_round_trip() {
    let values: Vec<i8> = (0..70_000).map(|v| (v % 251) as i8).collect();
    let bytes = write_with(&hessian(), |out| {
        out.write_object(Some(&ObjRef::array(PrimitiveArray::Byte(values.clone()))))
            .expect("bytes");
    });

    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    assert_eq!(
        input.read_object().expect("read").and_then(|a| a.as_primitive_array()),
        Some(PrimitiveArray::Byte(values))
    );
}

#[test]
fn corrupt_array_lengths_fail_without_allocating() {
    // new byte[] claiming i32::MAX bytes, backed by a three-byte binary
    let bytes = vec![b'I', 0x80, 0x00, 0x00, 0x02, b'I', 0x7f, 0xff, 0xff, 0xff, 0x23, 1, 2, 3];
    let mut input = ObjectInput::with_config(Cursor::new(bytes), &hessian());
    assert!(matches!(input.read_object(), Err(Error::StreamCorrupted { .. })));

    // new int[] claiming i32::MAX elements, backed by one
    let ints = vec![b'I', 0x80, 0x00, 0x00, 0x05, b'I', 0x7f, 0xff, 0xff, 0xff, 0x91];
    let mut input = ObjectInput::with_config(Cursor::new(ints), &hessian());
    assert!(matches!(input.read_object(), Err(Error::EndOfStream)));
}
