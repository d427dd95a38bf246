// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Modified UTF-8.
//!
//! Strings are encoded per UTF-16 code unit: `0x0001..=0x007F` take one
//! byte, `0x0000` and `0x0080..=0x07FF` take two, everything else three.
//! Supplementary characters therefore appear as two three-byte surrogates.

use crate::error::{Error, Result};

/// Append the encoding of one UTF-16 code unit.
#[inline]
pub fn encode_unit(unit: u16, out: &mut Vec<u8>) {
    match unit {
        0x0001..=0x007F => out.push(unit as u8),
        0x0000 | 0x0080..=0x07FF => {
            out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
            out.push(0x80 | (unit & 0x3F) as u8);
        }
        _ => {
            out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
            out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
            out.push(0x80 | (unit & 0x3F) as u8);
        }
    }
}

/// Encoded size of `s` in bytes.
#[must_use]
pub fn encoded_len(s: &str) -> usize {
    s.encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}

#[must_use]
pub fn encode(s: &str) -> Vec<u8> {
    // ASCII fast path: the encoding is the string itself.
    if s.bytes().all(|b| (0x01..=0x7F).contains(&b)) {
        return s.as_bytes().to_vec();
    }
    let mut out = Vec::with_capacity(encoded_len(s));
    for unit in s.encode_utf16() {
        encode_unit(unit, &mut out);
    }
    out
}

/// Decode to UTF-16 code units without pairing surrogates.
pub fn decode_units(bytes: &[u8]) -> Result<Vec<u16>> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        match b0 >> 4 {
            0x0..=0x7 => {
                units.push(u16::from(b0));
                i += 1;
            }
            0xC | 0xD => {
                let b1 = continuation(bytes, i, 1)?;
                units.push((u16::from(b0 & 0x1F) << 6) | u16::from(b1 & 0x3F));
                i += 2;
            }
            0xE => {
                let b1 = continuation(bytes, i, 1)?;
                let b2 = continuation(bytes, i, 2)?;
                units.push(
                    (u16::from(b0 & 0x0F) << 12)
                        | (u16::from(b1 & 0x3F) << 6)
                        | u16::from(b2 & 0x3F),
                );
                i += 3;
            }
            _ => {
                return Err(Error::corrupted(format!(
                    "malformed UTF data: byte 0x{:02x} at {}",
                    b0, i
                )))
            }
        }
    }
    Ok(units)
}

#[inline]
fn continuation(bytes: &[u8], start: usize, offset: usize) -> Result<u8> {
    match bytes.get(start + offset) {
        Some(b) if b & 0xC0 == 0x80 => Ok(*b),
        Some(b) => Err(Error::corrupted(format!(
            "malformed UTF data: byte 0x{:02x} at {} is not a continuation",
            b,
            start + offset
        ))),
        None => Err(Error::corrupted(format!(
            "malformed UTF data: sequence at {} is truncated",
            start
        ))),
    }
}

pub fn decode(bytes: &[u8]) -> Result<String> {
    if bytes.iter().all(|b| *b < 0x80) {
        // All ASCII: already valid UTF-8.
        return String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::corrupted(format!("malformed UTF data: {}", e)));
    }
    let units = decode_units(bytes)?;
    String::from_utf16(&units).map_err(|_| Error::corrupted("malformed UTF data: unpaired surrogate"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_one_byte_per_char() {
        assert_eq!(encode("hi"), b"hi".to_vec());
        assert_eq!(encoded_len("hello"), 5);
    }

    #[test]
    fn nul_takes_two_bytes() {
        assert_eq!(encode("\0"), vec![0xC0, 0x80]);
        assert_eq!(decode(&[0xC0, 0x80]).expect("valid"), "\0");
    }

    #[test]
    fn two_and_three_byte_forms() {
        assert_eq!(encode("\u{e9}"), vec![0xC3, 0xA9]);
        assert_eq!(encode("\u{20ac}"), vec![0xE2, 0x82, 0xAC]);
        assert_eq!(decode(&encode("caf\u{e9} \u{20ac}5")).expect("valid"), "caf\u{e9} \u{20ac}5");
    }

    #[test]
    fn supplementary_chars_become_surrogate_pairs() {
        let s = "\u{1F600}";
        let bytes = encode(s);
        assert_eq!(bytes.len(), 6);
        assert_eq!(bytes[0], 0xED);
        assert_eq!(encoded_len(s), 6);
        assert_eq!(decode(&bytes).expect("valid"), s);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let err = decode(&[b'a', 0xC3]).expect_err("truncated sequence");
        assert!(err.to_string().contains("truncated"));

        let err = decode(&[0xF0, 0x9F, 0x98, 0x80]).expect_err("4-byte form is not modified UTF-8");
        assert!(matches!(err, Error::StreamCorrupted { .. }));

        let err = decode(&[0xED, 0xA0, 0x80]).expect_err("lone high surrogate");
        assert!(err.to_string().contains("surrogate"));
    }
}
