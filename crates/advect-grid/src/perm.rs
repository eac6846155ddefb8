//! Cyclic axis permutation.
//!
//! Formulae are written once with the advected axis in canonical
//! position 0. [`pi`] maps such a canonical tuple onto real array
//! indices for any axis `d`; [`pi_inv`] undoes it.

/// Map a canonical index tuple onto array order for axis `d`.
///
/// Canonical position `m` lands at array position `(d + m) % D`, so the
/// canonical leading entry always addresses axis `d`.
///
/// ```
/// use advect_grid::pi;
///
/// // Axis 1 of a 2-D array: canonical (j, i) becomes array (i, j).
/// assert_eq!(pi(1, [7, 3]), [3, 7]);
/// assert_eq!(pi(0, [7, 3]), [7, 3]);
/// ```
#[inline]
pub fn pi<X: Copy, const D: usize>(d: usize, canon: [X; D]) -> [X; D] {
    debug_assert!(d < D, "axis {d} out of range for {D}-d permutation");
    let mut out = canon;
    for (m, v) in canon.into_iter().enumerate() {
        out[(d + m) % D] = v;
    }
    out
}

/// Inverse of [`pi`]: recover the canonical tuple from array order.
#[inline]
pub fn pi_inv<X: Copy, const D: usize>(d: usize, idx: [X; D]) -> [X; D] {
    debug_assert!(d < D, "axis {d} out of range for {D}-d permutation");
    let mut out = idx;
    for (m, slot) in out.iter_mut().enumerate() {
        *slot = idx[(d + m) % D];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_for_axis_zero() {
        assert_eq!(pi(0, [1, 2, 3]), [1, 2, 3]);
        assert_eq!(pi(0, [5]), [5]);
    }

    #[test]
    fn leading_canonical_entry_lands_on_axis() {
        for d in 0..3 {
            let out = pi(d, [10, 20, 30]);
            assert_eq!(out[d], 10);
        }
    }

    #[test]
    fn three_d_rotation() {
        assert_eq!(pi(1, [1, 2, 3]), [3, 1, 2]);
        assert_eq!(pi(2, [1, 2, 3]), [2, 3, 1]);
    }

    proptest! {
        #[test]
        fn inverse_roundtrip(d in 0usize..3, a in -50i32..50, b in -50i32..50, c in -50i32..50) {
            let canon = [a, b, c];
            prop_assert_eq!(pi_inv(d, pi(d, canon)), canon);
            prop_assert_eq!(pi(d, pi_inv(d, canon)), canon);
        }
    }
}
