//! Fixed-width LWE words.
//!
//! Hybrid outputs live in `Z_Q` with `Q = 2^32` or `2^64`; arithmetic wraps
//! at the word width, which is exactly reduction modulo `Q`.

use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// An unsigned word used as an element of `Z_{2^BITS}`.
pub trait LweWord:
    sealed::Sealed + Copy + Default + Debug + Eq + Ord + Send + Sync + 'static
{
    /// Word width; also `log2(Q)`.
    const BITS: u32;

    /// Truncates to the low `BITS` bits (reduction mod Q).
    fn from_u128_wrapping(v: u128) -> Self;

    fn from_u64_wrapping(v: u64) -> Self {
        Self::from_u128_wrapping(v as u128)
    }

    fn to_u64(self) -> u64;

    fn wrapping_add(self, rhs: Self) -> Self;

    fn wrapping_sub(self, rhs: Self) -> Self;

    fn wrapping_mul(self, rhs: Self) -> Self;
}

impl LweWord for u32 {
    const BITS: u32 = 32;

    #[inline]
    fn from_u128_wrapping(v: u128) -> Self {
        v as u32
    }

    #[inline]
    fn to_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        u32::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u32::wrapping_sub(self, rhs)
    }

    #[inline]
    fn wrapping_mul(self, rhs: Self) -> Self {
        u32::wrapping_mul(self, rhs)
    }
}

impl LweWord for u64 {
    const BITS: u32 = 64;

    #[inline]
    fn from_u128_wrapping(v: u128) -> Self {
        v as u64
    }

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        u64::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u64::wrapping_sub(self, rhs)
    }

    #[inline]
    fn wrapping_mul(self, rhs: Self) -> Self {
        u64::wrapping_mul(self, rhs)
    }
}
