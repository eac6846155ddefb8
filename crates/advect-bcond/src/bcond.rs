//! The [`BoundaryCondition`] trait, [`Side`], and shared box helpers.

use std::fmt;

use advect_arena::{ArrVec, Array};
use advect_core::{BcError, Real};
use advect_grid::Rng;

/// Which end of an axis a boundary sits at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Low-index end.
    Left,
    /// High-index end.
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Ghost cells of a cell-centred axis with `n` cells.
    pub const fn sclr_halo(self, n: i32, halo: i32) -> Rng {
        match self {
            Self::Left => Rng::new(-halo, -1),
            Self::Right => Rng::new(n, n - 1 + halo),
        }
    }

    /// Ghost faces of a face-centred axis with `n` cells.
    ///
    /// On the left this includes the domain-edge face `-½`.
    pub const fn vctr_halo(self, n: i32, halo: i32) -> Rng {
        match self {
            Self::Left => Rng::new(-halo - 1, -1),
            Self::Right => Rng::new(n, n - 1 + halo),
        }
    }

    /// Interior cell adjacent to this side.
    pub const fn sclr_edge(self, n: i32) -> i32 {
        match self {
            Self::Left => 0,
            Self::Right => n - 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Fills the ghost cells of one side of one axis.
///
/// One instance exists per `(axis, side)` and is owned by the rank whose
/// subdomain touches that side. The solver core calls these methods
/// between barriers; an implementation may read any cell of the box
/// it is given (plus the interior along its axis) and must write only
/// ghost cells of its own side. "Fill" means the ghost region inside the
/// box is totally overwritten.
///
/// # Object safety
///
/// The trait is object-safe; the solver stores handles as
/// `Box<dyn BoundaryCondition<T, D>>`.
///
/// # Examples
///
/// ```
/// use advect_arena::Array;
/// use advect_bcond::{BoundaryCondition, Cyclic, Side};
/// use advect_grid::{rng_sclr, Rng};
///
/// let psi = Array::<f64, 1>::new([rng_sclr(4, 1)]).unwrap();
/// psi.fill_with(&[Rng::interior(4)], |[i]| f64::from(i));
///
/// let mut left = Cyclic::new(0, Side::Left, 4);
/// BoundaryCondition::<f64, 1>::fill_halos_sclr(&mut left, &psi, &[Rng::interior(4)], false)
///     .unwrap();
/// assert_eq!(psi.get([-1]), 3.0);
/// ```
pub trait BoundaryCondition<T: Real, const D: usize>: Send {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// Axis this handle serves.
    fn axis(&self) -> usize;

    /// Side of the axis this handle serves.
    fn side(&self) -> Side;

    /// Fill the scalar ghost cells of `arr`.
    ///
    /// With `deriv`, the array holds a derivative-like quantity and the
    /// boundary may treat it differently (zeroing it, for instance).
    fn fill_halos_sclr(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        deriv: bool,
    ) -> Result<(), BcError>;

    /// Fill the ghost faces of component [`axis`](Self::axis) of a vector
    /// field, staggered along that axis.
    fn fill_halos_vctr_alng(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError>;

    /// Fill the ghost cells, along this handle's axis, of a vector
    /// component staggered along a different axis.
    fn fill_halos_vctr_nrml(&mut self, arr: &Array<T, D>, ortho: &[Rng; D])
        -> Result<(), BcError>;

    /// Fill the ghost cells of a pressure-like field.
    fn fill_halos_pres(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError>;

    /// Impose the edge value of a pressure-like field, multiplied by
    /// `sign`.
    fn set_edge_pres(&mut self, arr: &Array<T, D>, ortho: &[Rng; D], sign: i32)
        -> Result<(), BcError>;

    /// Record the edge velocity of `arr` for later use by the boundary.
    fn save_edge_vel(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError>;
}

/// `ortho` with its `axis` entry replaced by `r`.
pub(crate) fn along<const D: usize>(ortho: &[Rng; D], axis: usize, r: Rng) -> [Rng; D] {
    let mut bx = *ortho;
    bx[axis] = r;
    bx
}

/// Offset vector that is `k` along `axis` and zero elsewhere.
pub(crate) fn offset<const D: usize>(axis: usize, k: i32) -> [i32; D] {
    let mut off = [0; D];
    off[axis] = k;
    off
}

/// Fail with [`BcError::ShapeMismatch`] unless `arr` covers `bx`.
pub(crate) fn check_covers<T: Real, const D: usize>(
    arr: &Array<T, D>,
    bx: &[Rng; D],
    axis: usize,
) -> Result<(), BcError> {
    if arr.covers(bx) {
        Ok(())
    } else {
        Err(BcError::ShapeMismatch {
            axis,
            expected: format!("box {bx:?} inside {:?}", arr.shape()),
        })
    }
}

/// Copy `arr[idx + off] → arr[idx]` over `dst`, after checking that both
/// boxes lie inside the array.
pub(crate) fn copy_checked<T: Real, const D: usize>(
    arr: &Array<T, D>,
    dst: &[Rng; D],
    axis: usize,
    k: i32,
) -> Result<(), BcError> {
    let src = along(dst, axis, dst[axis].shift(k));
    check_covers(arr, dst, axis)?;
    check_covers(arr, &src, axis)?;
    arr.copy_shifted(dst, offset(axis, k));
    Ok(())
}
