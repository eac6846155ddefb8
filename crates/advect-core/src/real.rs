//! The floating-point element type shared by every array in the solver.

use num_traits::Float;
use std::fmt::{Debug, Display};

/// Floating-point scalar stored in solver arrays.
///
/// Implemented for `f32` and `f64`. Besides the arithmetic provided by
/// [`Float`], a `Real` can round-trip through a `u64` bit pattern so the
/// memory manager can keep elements in atomic cells shared between
/// subdomain threads.
pub trait Real: Float + Default + Debug + Display + Send + Sync + 'static {
    /// Widen the bit pattern of `self` into a `u64`.
    fn to_raw(self) -> u64;

    /// Rebuild a value from a bit pattern produced by [`to_raw`](Real::to_raw).
    fn from_raw(raw: u64) -> Self;

    /// Lossless-enough conversion used for diagnostics and error payloads.
    fn as_f64(self) -> f64;

    /// Conversion from an `f64` literal (rounds for `f32`).
    fn of(value: f64) -> Self;
}

impl Real for f32 {
    #[inline]
    fn to_raw(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline]
    fn from_raw(raw: u64) -> Self {
        f32::from_bits(raw as u32)
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn of(value: f64) -> Self {
        value as f32
    }
}

impl Real for f64 {
    #[inline]
    fn to_raw(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_raw(raw: u64) -> Self {
        f64::from_bits(raw)
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn of(value: f64) -> Self {
        value
    }
}
