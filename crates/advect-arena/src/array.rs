//! Shared `D`-dimensional arrays over signed index boxes.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use advect_core::Real;
use advect_grid::{for_each_index, Rng};

use crate::error::MemError;

/// A fixed-size set of arrays, one per axis (e.g. the Courant components).
pub type ArrVec<'a, T, const D: usize> = [&'a Array<T, D>; D];

/// A `D`-dimensional array of `T` addressed by signed indices.
///
/// The index box is fixed at construction and may start below zero so
/// halo cells are addressed directly. Elements are stored as atomic bit
/// patterns: any number of threads may read and write through `&Array`,
/// and callers are responsible for keeping concurrent writes to disjoint
/// cells and separating phases with a barrier.
///
/// Indexing outside the box panics, like slice indexing.
pub struct Array<T: Real, const D: usize> {
    shape: [Rng; D],
    strides: [usize; D],
    data: Box<[AtomicU64]>,
    _elem: PhantomData<T>,
}

impl<T: Real, const D: usize> Array<T, D> {
    /// Allocate a zero-filled array over `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::ShapeOverflow`] if the element count does not
    /// fit in `usize`.
    pub fn new(shape: [Rng; D]) -> Result<Self, MemError> {
        let mut strides = [0usize; D];
        let mut len = 1usize;
        for axis in (0..D).rev() {
            strides[axis] = len;
            len = len
                .checked_mul(shape[axis].len())
                .ok_or(MemError::ShapeOverflow { axis })?;
        }
        let zero = T::zero().to_raw();
        let data = (0..len).map(|_| AtomicU64::new(zero)).collect();
        Ok(Self {
            shape,
            strides,
            data,
            _elem: PhantomData,
        })
    }

    /// The index box.
    pub fn shape(&self) -> &[Rng; D] {
        &self.shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the array holds no element.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes occupied by element storage.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<AtomicU64>()
    }

    /// Check whether every index of `bx` is inside the array.
    pub fn covers(&self, bx: &[Rng; D]) -> bool {
        self.shape.iter().zip(bx).all(|(s, b)| s.covers(*b))
    }

    #[inline]
    fn offset(&self, idx: [i32; D]) -> Option<usize> {
        let mut off = 0usize;
        for axis in 0..D {
            let r = self.shape[axis];
            if !r.contains(idx[axis]) {
                return None;
            }
            off += (idx[axis] - r.first()) as usize * self.strides[axis];
        }
        Some(off)
    }

    #[inline]
    fn slot(&self, idx: [i32; D]) -> &AtomicU64 {
        match self.offset(idx) {
            Some(off) => &self.data[off],
            None => panic!("index {idx:?} outside array box {:?}", self.shape),
        }
    }

    /// Read one element.
    ///
    /// # Panics
    ///
    /// Panics if `idx` lies outside the array box.
    #[inline]
    pub fn get(&self, idx: [i32; D]) -> T {
        T::from_raw(self.slot(idx).load(Ordering::Relaxed))
    }

    /// Read one element, or `None` outside the box.
    pub fn try_get(&self, idx: [i32; D]) -> Option<T> {
        self.offset(idx)
            .map(|off| T::from_raw(self.data[off].load(Ordering::Relaxed)))
    }

    /// Write one element.
    ///
    /// # Panics
    ///
    /// Panics if `idx` lies outside the array box.
    #[inline]
    pub fn set(&self, idx: [i32; D], value: T) {
        self.slot(idx).store(value.to_raw(), Ordering::Relaxed);
    }

    /// Overwrite every element, halo included.
    pub fn fill(&self, value: T) {
        let raw = value.to_raw();
        for cell in self.data.iter() {
            cell.store(raw, Ordering::Relaxed);
        }
    }

    /// Overwrite every element of `bx`.
    pub fn fill_box(&self, bx: &[Rng; D], value: T) {
        for_each_index(bx, |idx| self.set(idx, value));
    }

    /// Set every element of `bx` from a function of its index.
    pub fn fill_with(&self, bx: &[Rng; D], mut f: impl FnMut([i32; D]) -> T) {
        for_each_index(bx, |idx| self.set(idx, f(idx)));
    }

    /// Copy the elements of `bx` from `src` at the same indices.
    pub fn copy_box_from(&self, src: &Array<T, D>, bx: &[Rng; D]) {
        for_each_index(bx, |idx| self.set(idx, src.get(idx)));
    }

    /// Copy within the array: `self[idx] = self[idx + offset]` for every
    /// `idx` in `dst`.
    ///
    /// Used to fill ghost cells from interior cells. Source and
    /// destination must not overlap.
    pub fn copy_shifted(&self, dst: &[Rng; D], offset: [i32; D]) {
        for_each_index(dst, |idx| {
            let mut src = idx;
            for (s, o) in src.iter_mut().zip(offset) {
                *s += o;
            }
            self.set(idx, self.get(src));
        });
    }

    /// Elements of `bx` in row-major order.
    pub fn to_vec(&self, bx: &[Rng; D]) -> Vec<T> {
        let mut out = Vec::with_capacity(bx.iter().map(|r| r.len()).product());
        for_each_index(bx, |idx| out.push(self.get(idx)));
        out
    }

    /// Sum of the elements of `bx`, accumulated in row-major order.
    pub fn sum(&self, bx: &[Rng; D]) -> T {
        let mut acc = T::zero();
        for_each_index(bx, |idx| acc = acc + self.get(idx));
        acc
    }

    /// Smallest element of `bx`, or `None` for an empty box.
    pub fn min(&self, bx: &[Rng; D]) -> Option<T> {
        let mut out: Option<T> = None;
        for_each_index(bx, |idx| {
            let v = self.get(idx);
            out = Some(match out {
                Some(m) if m <= v => m,
                _ => v,
            });
        });
        out
    }
}

impl<T: Real, const D: usize> fmt::Debug for Array<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("shape", &self.shape)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_indices_address_halo() {
        let a = Array::<f64, 1>::new([Rng::new(-2, 3)]).unwrap();
        a.set([-2], 7.0);
        a.set([3], 9.0);
        assert_eq!(a.get([-2]), 7.0);
        assert_eq!(a.get([3]), 9.0);
        assert_eq!(a.len(), 6);
        assert_eq!(a.try_get([4]), None);
    }

    #[test]
    fn row_major_layout() {
        let a = Array::<f32, 2>::new([Rng::new(0, 1), Rng::new(-1, 1)]).unwrap();
        a.fill_with(a.shape(), |[i, j]| (10 * i + j) as f32);
        assert_eq!(a.to_vec(a.shape()), vec![-1.0, 0.0, 1.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn copy_shifted_wraps_ghosts() {
        let a = Array::<f64, 1>::new([Rng::new(-1, 4)]).unwrap();
        a.fill_with(&[Rng::new(0, 3)], |[i]| i as f64);
        a.copy_shifted(&[Rng::point(-1)], [4]);
        a.copy_shifted(&[Rng::point(4)], [-4]);
        assert_eq!(a.get([-1]), 3.0);
        assert_eq!(a.get([4]), 0.0);
    }

    #[test]
    fn sum_and_min_over_box() {
        let a = Array::<f64, 2>::new([Rng::new(-1, 2), Rng::new(-1, 2)]).unwrap();
        a.fill(100.0);
        let interior = [Rng::new(0, 1), Rng::new(0, 1)];
        a.fill_box(&interior, 1.5);
        assert_eq!(a.sum(&interior), 6.0);
        assert_eq!(a.min(a.shape()), Some(1.5));
        assert_eq!(a.min(&[Rng::new(1, 0), Rng::new(0, 1)]), None);
    }

    proptest::proptest! {
        #[test]
        fn box_reductions_match_plain_iteration(
            values in proptest::collection::vec(-1e3f64..1e3, 12),
            lo in 0i32..3,
            len in 0i32..4,
        ) {
            let shape = [Rng::new(0, 2), Rng::new(0, 3)];
            let a = Array::<f64, 2>::new(shape).unwrap();
            a.fill_with(&shape, |[i, j]| values[(4 * i + j) as usize]);
            let bx = [Rng::new(lo, 2), Rng::new(0, len - 1)];
            let picked: Vec<f64> = a.to_vec(&bx);
            let expect: Vec<f64> = (lo..=2)
                .flat_map(|i| (0..len).map(move |j| (i, j)))
                .map(|(i, j)| values[(4 * i + j) as usize])
                .collect();
            proptest::prop_assert_eq!(&picked, &expect);
            proptest::prop_assert_eq!(a.sum(&bx), expect.iter().fold(0.0, |s, v| s + v));
            proptest::prop_assert_eq!(a.min(&bx), expect.iter().copied().reduce(f64::min));
        }
    }

    #[test]
    fn copy_box_from_other_array() {
        let shape = [Rng::new(0, 2)];
        let a = Array::<f64, 1>::new(shape).unwrap();
        let b = Array::<f64, 1>::new(shape).unwrap();
        b.fill(2.0);
        a.copy_box_from(&b, &[Rng::new(1, 2)]);
        assert_eq!(a.to_vec(&shape), vec![0.0, 2.0, 2.0]);
    }

    #[test]
    fn covers_checks_every_axis() {
        let a = Array::<f64, 2>::new([Rng::new(-1, 3), Rng::new(0, 2)]).unwrap();
        assert!(a.covers(&[Rng::new(0, 3), Rng::new(0, 2)]));
        assert!(!a.covers(&[Rng::new(0, 3), Rng::new(-1, 2)]));
    }

    #[test]
    #[should_panic(expected = "outside array box")]
    fn out_of_box_panics() {
        let a = Array::<f64, 1>::new([Rng::new(0, 1)]).unwrap();
        a.get([2]);
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let huge = Rng::new(0, i32::MAX - 1);
        let err = Array::<f64, 3>::new([huge, huge, huge]).unwrap_err();
        assert!(matches!(err, MemError::ShapeOverflow { .. }));
    }
}
