//! Inclusive index ranges and the half-index staggering convention.

use std::fmt;
use std::ops::{Add, BitXor, RangeInclusive, Sub};

/// Half-cell offset marker.
///
/// `i + H` is the face to the right of cell `i`, stored at integer `i`;
/// `i - H` is the face to its left, stored at `i - 1`. The same shift
/// applies to a whole [`Rng`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Half;

/// The half-cell offset, spelled the way the formulae read.
pub const H: Half = Half;

impl Add<Half> for i32 {
    type Output = i32;

    #[inline]
    fn add(self, _: Half) -> i32 {
        self
    }
}

impl Sub<Half> for i32 {
    type Output = i32;

    #[inline]
    fn sub(self, _: Half) -> i32 {
        self - 1
    }
}

/// Inclusive range of integer indices `first..=last`.
///
/// Indices are signed so that halo cells to the left of the domain
/// (`-1`, `-2`, ...) are addressed directly. A range with
/// `last == first - 1` is empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rng {
    first: i32,
    last: i32,
}

impl Rng {
    /// Create the range `first..=last`.
    ///
    /// `last` may be `first - 1` to express an empty range; anything
    /// smaller is normalised to that.
    pub const fn new(first: i32, last: i32) -> Self {
        let last = if last < first - 1 { first - 1 } else { last };
        Self { first, last }
    }

    /// The interior range `0..=n-1` of an axis with `n` cells.
    pub const fn interior(n: i32) -> Self {
        Self::new(0, n - 1)
    }

    /// A single index.
    pub const fn point(i: i32) -> Self {
        Self { first: i, last: i }
    }

    /// First index.
    pub const fn first(self) -> i32 {
        self.first
    }

    /// Last index (inclusive).
    pub const fn last(self) -> i32 {
        self.last
    }

    /// Number of indices.
    pub const fn len(self) -> usize {
        (self.last - self.first + 1) as usize
    }

    /// Returns `true` if the range holds no index.
    pub const fn is_empty(self) -> bool {
        self.last < self.first
    }

    /// Check whether `i` lies in the range.
    pub const fn contains(self, i: i32) -> bool {
        i >= self.first && i <= self.last
    }

    /// Check whether `other` lies entirely inside `self`.
    pub const fn covers(self, other: Rng) -> bool {
        other.is_empty() || (other.first >= self.first && other.last <= self.last)
    }

    /// Extend both ends by `h` cells (`i^h` in halo notation).
    pub const fn ext(self, h: i32) -> Self {
        Self::new(self.first - h, self.last + h)
    }

    /// Extend only the low end by `lo` and the high end by `hi` cells.
    pub const fn ext_by(self, lo: i32, hi: i32) -> Self {
        Self::new(self.first - lo, self.last + hi)
    }

    /// Shift the range by `k`.
    pub const fn shift(self, k: i32) -> Self {
        Self {
            first: self.first + k,
            last: self.last + k,
        }
    }

    /// Iterate over the indices.
    pub fn iter(self) -> RangeInclusive<i32> {
        self.first..=self.last
    }
}

impl fmt::Debug for Rng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}..={})", self.first, self.last)
    }
}

impl fmt::Display for Rng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

impl Add<Half> for Rng {
    type Output = Rng;

    #[inline]
    fn add(self, _: Half) -> Rng {
        self
    }
}

impl Sub<Half> for Rng {
    type Output = Rng;

    #[inline]
    fn sub(self, _: Half) -> Rng {
        self.shift(-1)
    }
}

impl Add<i32> for Rng {
    type Output = Rng;

    fn add(self, k: i32) -> Rng {
        self.shift(k)
    }
}

impl Sub<i32> for Rng {
    type Output = Rng;

    fn sub(self, k: i32) -> Rng {
        self.shift(-k)
    }
}

impl BitXor<i32> for Rng {
    type Output = Rng;

    fn bitxor(self, h: i32) -> Rng {
        self.ext(h)
    }
}

impl IntoIterator for Rng {
    type Item = i32;
    type IntoIter = RangeInclusive<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Allocation range of a scalar (cell-centred) axis with `n` cells.
pub const fn rng_sclr(n: i32, halo: i32) -> Rng {
    Rng::interior(n).ext(halo)
}

/// Allocation range of a vector (face-centred) axis with `n` cells.
///
/// Covers faces `-halo-½ ..= n-1+halo+½`, i.e. integers
/// `-halo-1 ..= n-1+halo`.
pub const fn rng_vctr(n: i32, halo: i32) -> Rng {
    Rng::new(-halo - 1, n - 1 + halo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_shifts_match_storage_convention() {
        assert_eq!(0i32 + H, 0);
        assert_eq!(0i32 - H, -1);
        let r = Rng::new(2, 5);
        assert_eq!(r + H, r);
        assert_eq!(r - H, Rng::new(1, 4));
    }

    #[test]
    fn ext_and_xor_agree() {
        let r = Rng::interior(10);
        assert_eq!(r ^ 1, Rng::new(-1, 10));
        assert_eq!(r.ext(2), Rng::new(-2, 11));
        assert_eq!(r.ext_by(1, 0), Rng::new(-1, 9));
    }

    #[test]
    fn empty_range_is_normalised() {
        let r = Rng::new(5, 1);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.iter().count(), 0);
    }

    #[test]
    fn sclr_and_vctr_shapes() {
        assert_eq!(rng_sclr(20, 1), Rng::new(-1, 20));
        assert_eq!(rng_vctr(20, 1), Rng::new(-2, 20));
        // One more face than cells, on each side covered by the halo.
        assert_eq!(rng_vctr(20, 1).len(), rng_sclr(20, 1).len() + 1);
    }

    #[test]
    fn covers_and_contains() {
        let r = Rng::new(-1, 4);
        assert!(r.contains(-1));
        assert!(!r.contains(5));
        assert!(r.covers(Rng::new(0, 4)));
        assert!(!r.covers(Rng::new(0, 5)));
        assert!(r.covers(Rng::new(9, 3)));
    }
}
