//! Periodic boundary.

use advect_arena::{ArrVec, Array};
use advect_core::{BcError, Real, HALO};
use advect_grid::Rng;

use crate::bcond::{along, copy_checked, BoundaryCondition, Side};

/// Periodic boundary: ghost cells copy the interior cells `n` away.
///
/// Face-centred data wraps the same way, so the left ghost faces
/// `-halo-½ ..= -½` take the values of faces `n-halo-½ ..= n-½`.
/// Derivative mode changes nothing, and the pressure edge calls have no
/// work to do.
#[derive(Clone, Debug)]
pub struct Cyclic {
    axis: usize,
    side: Side,
    n: i32,
    halo: i32,
    name: String,
}

impl Cyclic {
    /// Periodic boundary on `side` of `axis`, which has `n` cells.
    pub fn new(axis: usize, side: Side, n: i32) -> Self {
        Self {
            axis,
            side,
            n,
            halo: HALO,
            name: format!("cyclic[{axis}:{side}]"),
        }
    }

    fn shift(&self) -> i32 {
        match self.side {
            Side::Left => self.n,
            Side::Right => -self.n,
        }
    }

    fn wrap<T: Real, const D: usize>(
        &self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        ghosts: Rng,
    ) -> Result<(), BcError> {
        copy_checked(arr, &along(ortho, self.axis, ghosts), self.axis, self.shift())
    }
}

impl<T: Real, const D: usize> BoundaryCondition<T, D> for Cyclic {
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
        _deriv: bool,
    ) -> Result<(), BcError> {
        self.wrap(arr, ortho, self.side.sclr_halo(self.n, self.halo))
    }

    fn fill_halos_vctr_alng(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        self.wrap(arrvec[self.axis], ortho, self.side.vctr_halo(self.n, self.halo))
    }

    fn fill_halos_vctr_nrml(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        self.wrap(arr, ortho, self.side.sclr_halo(self.n, self.halo))
    }

    fn fill_halos_pres(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.wrap(arr, ortho, self.side.sclr_halo(self.n, self.halo))
    }

    fn set_edge_pres(
        &mut self,
        _arr: &Array<T, D>,
        _ortho: &[Rng; D],
        _sign: i32,
    ) -> Result<(), BcError> {
        Ok(())
    }

    fn save_edge_vel(&mut self, _arr: &Array<T, D>, _ortho: &[Rng; D]) -> Result<(), BcError> {
        Ok(())
    }
}
