//! The donor-cell flux `F` and its left/right face forms.

use advect_arena::Array;
use advect_core::Real;
use advect_grid::{pi, H};

/// Positive part of a Courant number, `max(c, 0)`.
#[inline]
pub fn pospart<T: Real>(c: T) -> T {
    c.max(T::zero())
}

/// Negative part of a Courant number, `min(c, 0)`.
#[inline]
pub fn negpart<T: Real>(c: T) -> T {
    c.min(T::zero())
}

/// Donor-cell flux through a face with Courant number `c`.
///
/// `F(ψl, ψr, C) = max(C,0)·ψl + min(C,0)·ψr`: the upwind value is
/// carried across the face.
#[inline]
pub fn f<T: Real>(psi_l: T, psi_r: T, c: T) -> T {
    pospart(c) * psi_l + negpart(c) * psi_r
}

#[inline]
fn along<const D: usize>(d: usize, mut canon: [i32; D], i: i32) -> [i32; D] {
    canon[0] = i;
    pi(d, canon)
}

/// Flux into cell `canon` through its left face along axis `d`.
///
/// `F(ψ(i-1), ψ(i), C(i-½))`, with `i = canon[0]`.
#[inline]
pub fn flux_left<T: Real, const D: usize>(
    psi: &Array<T, D>,
    gc: &Array<T, D>,
    d: usize,
    canon: [i32; D],
) -> T {
    let i = canon[0];
    f(
        psi.get(along(d, canon, i - 1)),
        psi.get(along(d, canon, i)),
        gc.get(along(d, canon, i - H)),
    )
}

/// Flux into cell `canon` through its right face along axis `d`.
///
/// `-F(ψ(i), ψ(i+1), C(i+½))`: the sign flip expresses the outflow as a
/// contribution into the cell.
#[inline]
pub fn flux_rght<T: Real, const D: usize>(
    psi: &Array<T, D>,
    gc: &Array<T, D>,
    d: usize,
    canon: [i32; D],
) -> T {
    let i = canon[0];
    -f(
        psi.get(along(d, canon, i)),
        psi.get(along(d, canon, i + 1)),
        gc.get(along(d, canon, i + H)),
    )
}
