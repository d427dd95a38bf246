// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-width element packing for bulk array transfer.
//!
//! The native wire order is little-endian.

use crate::constants::PrimitiveKind;

/// A primitive that can be packed into `SIZE` bytes.
pub trait Element: Copy + Default + 'static {
    const KIND: PrimitiveKind;
    const SIZE: usize;

    /// Store into `dst[..SIZE]`.
    fn store(self, dst: &mut [u8]);

    /// Load from `src[..SIZE]`.
    fn load(src: &[u8]) -> Self;
}

/// Generate `Element` for numeric types (eliminates code duplication)
///
/// Each generated impl converts with `to_le_bytes()` / `from_le_bytes()`.
macro_rules! impl_element_le {
    ($type:ty, $kind:ident, $size:expr) => {
        impl Element for $type {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;
            const SIZE: usize = $size;

            #[inline]
            fn store(self, dst: &mut [u8]) {
                dst[..$size].copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn load(src: &[u8]) -> Self {
                let mut bytes = [0u8; $size];
                bytes.copy_from_slice(&src[..$size]);
                <$type>::from_le_bytes(bytes)
            }
        }
    };
}

impl_element_le!(i8, Byte, 1);
impl_element_le!(u8, Byte, 1);
impl_element_le!(u16, Char, 2);
impl_element_le!(i16, Short, 2);
impl_element_le!(i32, Int, 4);
impl_element_le!(i64, Long, 8);
impl_element_le!(f32, Float, 4);
impl_element_le!(f64, Double, 8);

impl Element for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;
    const SIZE: usize = 1;

    #[inline]
    fn store(self, dst: &mut [u8]) {
        dst[0] = u8::from(self);
    }

    #[inline]
    fn load(src: &[u8]) -> Self {
        src[0] != 0
    }
}

/// Pack `values` into `dst`, which must hold `values.len() * T::SIZE` bytes.
pub fn pack<T: Element>(values: &[T], dst: &mut [u8]) {
    for (value, chunk) in values.iter().zip(dst.chunks_exact_mut(T::SIZE)) {
        value.store(chunk);
    }
}

/// Unpack `src` into `dst`, reading `dst.len() * T::SIZE` bytes.
pub fn unpack<T: Element>(src: &[u8], dst: &mut [T]) {
    for (slot, chunk) in dst.iter_mut().zip(src.chunks_exact(T::SIZE)) {
        *slot = T::load(chunk);
    }
}

/// Packed copy of `values`.
#[must_use]
pub fn to_bytes<T: Element>(values: &[T]) -> Vec<u8> {
    let mut bytes = vec![0u8; values.len() * T::SIZE];
    pack(values, &mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_is_little_endian() {
        assert_eq!(to_bytes(&[0x0102_0304i32]), vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(to_bytes(&[0x0102u16]), vec![0x02, 0x01]);
        assert_eq!(to_bytes(&[true, false]), vec![1, 0]);
    }

    #[test]
    fn unpack_restores_values() {
        let values = [1.5f64, -0.0, f64::MAX];
        let bytes = to_bytes(&values);
        let mut back = [0f64; 3];
        unpack(&bytes, &mut back);
        assert_eq!(back[0], 1.5);
        assert!(back[1].is_sign_negative());
        assert_eq!(back[2], f64::MAX);
    }

    #[test]
    fn element_widths() {
        assert_eq!(<bool as Element>::SIZE, 1);
        assert_eq!(<u16 as Element>::SIZE, 2);
        assert_eq!(<i64 as Element>::SIZE, 8);
        assert_eq!(<f32 as Element>::KIND, PrimitiveKind::Float);
    }
}
