//! Zero-gradient (open) boundary.

use advect_arena::{ArrVec, Array};
use advect_core::{BcError, Real, HALO};
use advect_grid::{for_each_index, Rng};

use crate::bcond::{along, check_covers, copy_checked, BoundaryCondition, Side};

/// Open boundary with a zero normal gradient.
///
/// Scalar ghost cells copy the adjacent interior cell, or are zeroed in
/// derivative mode. Ghost faces copy the domain-edge face, which is
/// itself left as set by the caller.
#[derive(Clone, Debug)]
pub struct Open {
    axis: usize,
    side: Side,
    n: i32,
    halo: i32,
    name: String,
}

impl Open {
    /// Open boundary on `side` of `axis`, which has `n` cells.
    pub fn new(axis: usize, side: Side, n: i32) -> Self {
        Self {
            axis,
            side,
            n,
            halo: HALO,
            name: format!("open[{axis}:{side}]"),
        }
    }

    /// Copy the edge cell into every scalar ghost layer.
    fn extrapolate<T: Real, const D: usize>(
        &self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        let edge = self.side.sclr_edge(self.n);
        for g in self.side.sclr_halo(self.n, self.halo) {
            copy_checked(arr, &along(ortho, self.axis, Rng::point(g)), self.axis, edge - g)?;
        }
        Ok(())
    }

    /// Stored index of the domain-edge face on this side.
    fn edge_face(&self) -> i32 {
        match self.side {
            Side::Left => -1,
            Side::Right => self.n - 1,
        }
    }

    /// Ghost faces beyond the domain-edge face.
    fn outer_faces(&self) -> Rng {
        match self.side {
            Side::Left => Rng::new(-self.halo - 1, -2),
            Side::Right => Rng::new(self.n, self.n - 1 + self.halo),
        }
    }
}

impl<T: Real, const D: usize> BoundaryCondition<T, D> for Open {
    fn name(&self) -> &str {
        &self.name
    }

    fn axis(&self) -> usize {
        self.axis
    }

    fn side(&self) -> Side {
        self.side
    }

    fn fill_halos_sclr(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        deriv: bool,
    ) -> Result<(), BcError> {
        if deriv {
            let bx = along(ortho, self.axis, self.side.sclr_halo(self.n, self.halo));
            check_covers(arr, &bx, self.axis)?;
            arr.fill_box(&bx, T::zero());
            return Ok(());
        }
        self.extrapolate(arr, ortho)
    }

    fn fill_halos_vctr_alng(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        let arr = arrvec[self.axis];
        let edge = self.edge_face();
        for g in self.outer_faces() {
            copy_checked(arr, &along(ortho, self.axis, Rng::point(g)), self.axis, edge - g)?;
        }
        Ok(())
    }

    fn fill_halos_vctr_nrml(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        self.extrapolate(arr, ortho)
    }

    fn fill_halos_pres(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.extrapolate(arr, ortho)
    }

    fn set_edge_pres(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        sign: i32,
    ) -> Result<(), BcError> {
        let edge = self.side.sclr_edge(self.n);
        let s = T::of(f64::from(sign));
        for g in self.side.sclr_halo(self.n, self.halo) {
            let dst = along(ortho, self.axis, Rng::point(g));
            let src = along(ortho, self.axis, Rng::point(edge));
            check_covers(arr, &dst, self.axis)?;
            check_covers(arr, &src, self.axis)?;
            let axis = self.axis;
            for_each_index(&dst, |idx| {
                let mut from = idx;
                from[axis] = edge;
                arr.set(idx, s * arr.get(from));
            });
        }
        Ok(())
    }

    fn save_edge_vel(&mut self, _arr: &Array<T, D>, _ortho: &[Rng; D]) -> Result<(), BcError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_grid::{rng_sclr, rng_vctr};

    fn field() -> Array<f64, 1> {
        let a = Array::new([rng_sclr(4, 1)]).unwrap();
        a.fill_with(&[Rng::interior(4)], |[i]| f64::from(i + 1));
        a
    }

    #[test]
    fn scalar_ghosts_copy_edge() {
        let a = field();
        for side in Side::BOTH {
            let mut b = Open::new(0, side, 4);
            BoundaryCondition::<f64, 1>::fill_halos_sclr(&mut b, &a, &[Rng::interior(4)], false)
                .unwrap();
        }
        assert_eq!(a.get([-1]), 1.0);
        assert_eq!(a.get([4]), 4.0);
    }

    #[test]
    fn derivative_ghosts_are_zero() {
        let a = field();
        a.fill_box(&[Rng::point(-1)], 5.0);
        let mut b = Open::new(0, Side::Left, 4);
        BoundaryCondition::<f64, 1>::fill_halos_sclr(&mut b, &a, &[Rng::interior(4)], true)
            .unwrap();
        assert_eq!(a.get([-1]), 0.0);
    }

    #[test]
    fn outer_faces_copy_edge_face() {
        let gc = Array::<f64, 1>::new([rng_vctr(4, 1)]).unwrap();
        gc.fill_with(&[Rng::new(-1, 3)], |[i]| f64::from(i));
        let set = [&gc];
        for side in Side::BOTH {
            let mut b = Open::new(0, side, 4);
            BoundaryCondition::<f64, 1>::fill_halos_vctr_alng(&mut b, &set, &[Rng::interior(4)])
                .unwrap();
        }
        assert_eq!(gc.get([-2]), -1.0);
        assert_eq!(gc.get([-1]), -1.0);
        assert_eq!(gc.get([4]), 3.0);
    }

    #[test]
    fn set_edge_pres_applies_sign() {
        let a = field();
        let mut r = Open::new(0, Side::Right, 4);
        BoundaryCondition::<f64, 1>::set_edge_pres(&mut r, &a, &[Rng::interior(4)], -1).unwrap();
        assert_eq!(a.get([4]), -4.0);
        assert_eq!(a.get([3]), 4.0);
    }

    #[test]
    fn two_d_fill_respects_ortho() {
        let a = Array::<f64, 2>::new([rng_sclr(2, 1), rng_sclr(3, 1)]).unwrap();
        a.fill_with(&[Rng::interior(2), Rng::interior(3)], |[i, j]| f64::from(10 * i + j));
        let mut b = Open::new(0, Side::Right, 2);
        BoundaryCondition::<f64, 2>::fill_halos_pres(
            &mut b,
            &a,
            &[Rng::point(0), Rng::interior(3)],
        )
        .unwrap();
        assert_eq!(a.to_vec(&[Rng::point(2), Rng::interior(3)]), vec![10.0, 11.0, 12.0]);
        assert_eq!(a.get([2, -1]), 0.0);
    }
}
