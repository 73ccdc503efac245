//! Fixed-width integer keys and bit access.
//!
//! Bits are numbered from the least significant end: for a key of width `W`,
//! bit `W - 1` is the most significant bit and the first one the tree
//! branches on.

use std::fmt;
use std::hash::Hash;

mod private {
    pub trait Sealed {}
}

/// An unsigned integer usable as a tree key.
///
/// Implemented for `u32` and `u64`; sealed so the width arithmetic in the
/// tree can rely on `BITS` being a power of two no wider than 64.
pub trait Key:
    private::Sealed + Copy + Eq + Ord + Hash + fmt::Debug + fmt::Binary + 'static
{
    /// Key width in bits.
    const BITS: u32;

    /// The all-zero key.
    const ZERO: Self;

    /// Bit `k` of `self`, `k = BITS - 1` being the most significant.
    fn bit(self, k: u32) -> u8;

    /// Keep the top `bits` bits, clearing the rest.
    fn mask(self, bits: u32) -> Self;
}

macro_rules! impl_key {
    ($($t:ty),*) => {$(
        impl private::Sealed for $t {}

        impl Key for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;

            #[inline]
            fn bit(self, k: u32) -> u8 {
                debug_assert!(k < Self::BITS, "bit index {k} out of range");
                ((self >> k) & 1) as u8
            }

            #[inline]
            fn mask(self, bits: u32) -> Self {
                debug_assert!(bits <= Self::BITS);
                if bits == 0 {
                    0
                } else {
                    self & (<$t>::MAX << (Self::BITS - bits))
                }
            }
        }
    )*};
}

impl_key!(u32, u64);

/// Branch taken at `depth` (number of bits already consumed) for `key`.
#[inline]
pub(crate) fn direction<K: Key>(key: K, depth: u32) -> usize {
    key.bit(K::BITS - 1 - depth) as usize
}
