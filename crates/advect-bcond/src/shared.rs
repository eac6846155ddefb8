//! Internal seam between two threads' subdomains.

use advect_arena::{ArrVec, Array};
use advect_core::{BcError, Real};
use advect_grid::Rng;

use crate::bcond::{BoundaryCondition, Side};

/// Boundary between two slabs of one shared array.
///
/// The halo on this side is the neighbouring rank's interior, which is
/// already in place once the preceding barrier has been passed, so every
/// call succeeds without touching the array.
#[derive(Clone, Debug)]
pub struct Shared {
    axis: usize,
    side: Side,
    name: String,
}

impl Shared {
    /// Seam on `side` of `axis`.
    pub fn new(axis: usize, side: Side) -> Self {
        Self {
            axis,
            side,
            name: format!("shared[{axis}:{side}]"),
        }
    }
}

impl<T: Real, const D: usize> BoundaryCondition<T, D> for Shared {
    fn name(&self) -> &str {
        &self.name
    }

    fn axis(&self) -> usize {
        self.axis
    }

    fn side(&self) -> Side {
        self.side
    }

    fn fill_halos_sclr(&mut self, _: &Array<T, D>, _: &[Rng; D], _: bool) -> Result<(), BcError> {
        Ok(())
    }

    fn fill_halos_vctr_alng(&mut self, _: &ArrVec<'_, T, D>, _: &[Rng; D]) -> Result<(), BcError> {
        Ok(())
    }

    fn fill_halos_vctr_nrml(&mut self, _: &Array<T, D>, _: &[Rng; D]) -> Result<(), BcError> {
        Ok(())
    }

    fn fill_halos_pres(&mut self, _: &Array<T, D>, _: &[Rng; D]) -> Result<(), BcError> {
        Ok(())
    }

    fn set_edge_pres(&mut self, _: &Array<T, D>, _: &[Rng; D], _: i32) -> Result<(), BcError> {
        Ok(())
    }

    fn save_edge_vel(&mut self, _: &Array<T, D>, _: &[Rng; D]) -> Result<(), BcError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seam_leaves_array_untouched() {
        let a = Array::<f64, 1>::new([Rng::new(-1, 3)]).unwrap();
        a.fill(2.0);
        let mut s = Shared::new(0, Side::Right);
        BoundaryCondition::<f64, 1>::fill_halos_sclr(&mut s, &a, &[Rng::interior(3)], true)
            .unwrap();
        BoundaryCondition::<f64, 1>::set_edge_pres(&mut s, &a, &[Rng::interior(3)], -1).unwrap();
        assert_eq!(a.to_vec(a.shape()), vec![2.0; 5]);
        assert_eq!(BoundaryCondition::<f64, 1>::name(&s), "shared[0:right]");
    }
}
