// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hessian-compatible primitive codec.
//!
//! Every value carries a leading tag byte; small values fold their payload
//! into the tag. Multi-byte payloads are big-endian.
//!
//! | Value | Form | Bytes |
//! |-------|------|-------|
//! | int in `-16..=47` | `0x90 + v` | 1 |
//! | int in `-1024..=2047` | `0xc8 + (v >> 8)`, `v` | 2 |
//! | int in `-262144..=262143` | `0xd4 + (v >> 16)`, `v >> 8`, `v` | 3 |
//! | int | `'I'`, 4 bytes | 5 |
//! | long in `-8..=15` | `0xe0 + v` | 1 |
//! | long in `-2048..=2047` | `0xf8 + (v >> 8)`, `v` | 2 |
//! | long in `-262144..=262143` | `0x3c + (v >> 16)`, 2 bytes | 3 |
//! | long in int range | `0x77`, 4 bytes | 5 |
//! | long | `'L'`, 8 bytes | 9 |
//! | double `0.0` / `1.0` | `0x67` / `0x68` | 1 |
//! | integral double in `i8` / `i16` | `0x69` / `0x6a` + payload | 2 / 3 |
//! | double exact as `f32` | `0x6b`, 4 bytes | 5 |
//! | double | `'D'`, 8 bytes | 9 |
//!
//! Strings count characters, not bytes: `0x00..=0x1f` carries the length in
//! the tag, `'S'` is followed by a `u16` length, and strings longer than
//! 65535 characters are cut into `'s'` chunks of exactly 65535 characters
//! before the final `'S'` chunk.
//!
//! Byte arrays use the binary forms (`0x20 + len` up to 15 bytes, `'b'`
//! chunks, final `'B'`). Other primitive arrays are sent element by element.

pub mod input;
pub mod output;

pub use input::HessianInput;
pub use output::HessianOutput;

// =======================================================================
// Scalars
// =======================================================================

pub const NULL: u8 = b'N';
pub const TRUE: u8 = b'T';
pub const FALSE: u8 = b'F';

// int

pub const INT_DIRECT_MIN: i32 = -0x10;
pub const INT_DIRECT_MAX: i32 = 0x2f;
pub const INT_ZERO: u8 = 0x90;
/// First and last tag of the one-byte int form.
pub const INT_DIRECT_TAG_MIN: u8 = 0x80;
pub const INT_DIRECT_TAG_MAX: u8 = 0xbf;

pub const INT_BYTE_MIN: i32 = -0x400;
pub const INT_BYTE_MAX: i32 = 0x7ff;
pub const INT_BYTE_ZERO: u8 = 0xc8;
pub const INT_BYTE_TAG_MIN: u8 = 0xc0;
pub const INT_BYTE_TAG_MAX: u8 = 0xcf;

pub const INT_SHORT_MIN: i32 = -0x40000;
pub const INT_SHORT_MAX: i32 = 0x3ffff;
pub const INT_SHORT_ZERO: u8 = 0xd4;
pub const INT_SHORT_TAG_MIN: u8 = 0xd0;
pub const INT_SHORT_TAG_MAX: u8 = 0xd7;

pub const INT: u8 = b'I';

// long

pub const LONG_DIRECT_MIN: i64 = -0x08;
pub const LONG_DIRECT_MAX: i64 = 0x0f;
pub const LONG_ZERO: u8 = 0xe0;
pub const LONG_DIRECT_TAG_MIN: u8 = 0xd8;
pub const LONG_DIRECT_TAG_MAX: u8 = 0xef;

pub const LONG_BYTE_MIN: i64 = -0x800;
pub const LONG_BYTE_MAX: i64 = 0x7ff;
pub const LONG_BYTE_ZERO: u8 = 0xf8;
pub const LONG_BYTE_TAG_MIN: u8 = 0xf0;
pub const LONG_BYTE_TAG_MAX: u8 = 0xff;

pub const LONG_SHORT_MIN: i64 = -0x40000;
pub const LONG_SHORT_MAX: i64 = 0x3ffff;
pub const LONG_SHORT_ZERO: u8 = 0x3c;
/// Tag range of the three-byte long form, derived from its own bounds.
pub const LONG_SHORT_TAG_MIN: u8 = LONG_SHORT_ZERO - 4;
pub const LONG_SHORT_TAG_MAX: u8 = LONG_SHORT_ZERO + 3;

pub const LONG_INT: u8 = 0x77;
pub const LONG: u8 = b'L';

// double

pub const DOUBLE_ZERO: u8 = 0x67;
pub const DOUBLE_ONE: u8 = 0x68;
pub const DOUBLE_BYTE: u8 = 0x69;
pub const DOUBLE_SHORT: u8 = 0x6a;
pub const DOUBLE_FLOAT: u8 = 0x6b;
pub const DOUBLE: u8 = b'D';

// =======================================================================
// Strings and binary
// =======================================================================

pub const STRING_DIRECT_MAX: usize = 0x1f;
/// Compact medium-string tags, accepted on input only.
pub const STRING_MEDIUM_TAG_MIN: u8 = 0x30;
pub const STRING_MEDIUM_TAG_MAX: u8 = 0x33;
pub const STRING_FINAL: u8 = b'S';
pub const STRING_CHUNK: u8 = b's';
/// Characters per non-final string chunk.
pub const STRING_CHUNK_SIZE: usize = 2 * 0x7fff + 1;

pub const BINARY_DIRECT_MAX: usize = 0x0f;
pub const BINARY_DIRECT: u8 = 0x20;
pub const BINARY_FINAL: u8 = b'B';
pub const BINARY_CHUNK: u8 = b'b';
pub const BINARY_CHUNK_SIZE: usize = u16::MAX as usize;
