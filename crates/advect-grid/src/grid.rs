//! Grid shape: per-axis extents plus halo-aware allocation ranges.

use advect_core::HALO;

use crate::error::GridError;
use crate::range::{rng_sclr, rng_vctr, Rng};

/// Largest extent accepted along any axis, leaving room for the halo
/// and the extra face in `i32` index space.
const MAX_EXTENT: usize = (i32::MAX as usize) / 2;

/// A structured `D`-dimensional grid of `extents[d]` cells per axis.
///
/// Scalar fields are allocated over [`sclr_shape`](Grid::sclr_shape);
/// the Courant component normal to axis `d` over
/// [`vctr_shape(d)`](Grid::vctr_shape).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid<const D: usize> {
    extents: [i32; D],
    halo: i32,
}

impl<const D: usize> Grid<D> {
    /// Create a grid with the workspace halo width.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnsupportedDimensionality`] unless `1 <= D <= 3`,
    /// [`GridError::EmptyAxis`] for a zero extent, and
    /// [`GridError::DimensionTooLarge`] if an extent would overflow the
    /// signed index space.
    pub fn new(extents: [usize; D]) -> Result<Self, GridError> {
        if D == 0 || D > 3 {
            return Err(GridError::UnsupportedDimensionality { ndim: D });
        }
        let mut out = [0i32; D];
        for (axis, (&n, slot)) in extents.iter().zip(out.iter_mut()).enumerate() {
            if n == 0 {
                return Err(GridError::EmptyAxis { axis });
            }
            if n > MAX_EXTENT {
                return Err(GridError::DimensionTooLarge {
                    axis,
                    value: n,
                    max: MAX_EXTENT,
                });
            }
            *slot = n as i32;
        }
        Ok(Self {
            extents: out,
            halo: HALO,
        })
    }

    /// Number of spatial dimensions.
    pub const fn ndim(&self) -> usize {
        D
    }

    /// Cells per axis.
    pub fn extents(&self) -> [usize; D] {
        self.extents.map(|n| n as usize)
    }

    /// Cells along `axis`.
    pub fn extent(&self, axis: usize) -> i32 {
        self.extents[axis]
    }

    /// Halo width.
    pub fn halo(&self) -> i32 {
        self.halo
    }

    /// Interior cell range along every axis.
    pub fn interior(&self) -> [Rng; D] {
        self.extents.map(Rng::interior)
    }

    /// Allocation box of a cell-centred field.
    pub fn sclr_shape(&self) -> [Rng; D] {
        let h = self.halo;
        self.extents.map(|n| rng_sclr(n, h))
    }

    /// Allocation box of the face-centred component normal to axis `d`.
    ///
    /// Axis `d` uses the vector range; the others are cell-centred.
    pub fn vctr_shape(&self, d: usize) -> [Rng; D] {
        let mut shape = self.sclr_shape();
        shape[d] = rng_vctr(self.extents[d], self.halo);
        shape
    }

    /// Total number of interior cells.
    pub fn cell_count(&self) -> usize {
        self.extents.iter().map(|&n| n as usize).product()
    }
}
