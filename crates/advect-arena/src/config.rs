//! Memory-manager configuration.

use advect_core::Opts;
use advect_grid::Grid;

use crate::error::MemError;

/// Configuration for a [`Mem`](crate::Mem).
///
/// Describes the global grid, how many equations are advected, how many
/// ranks will share the memory, and which optional arrays must exist.
/// Immutable once handed to [`Mem::new`](crate::Mem::new).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemConfig<const D: usize> {
    /// Cells per axis of the global domain.
    pub extents: [usize; D],
    /// Number of advected equations.
    pub n_eqns: usize,
    /// Number of cooperating ranks (threads). `1` is serial.
    pub n_ranks: usize,
    /// Numerical options; `NUG` and `KHN` add arrays.
    pub opts: Opts,
}

impl<const D: usize> MemConfig<D> {
    /// Single-rank configuration with no options.
    pub fn new(extents: [usize; D], n_eqns: usize) -> Self {
        Self {
            extents,
            n_eqns,
            n_ranks: 1,
            opts: Opts::empty(),
        }
    }

    /// Check the configuration and build its grid.
    ///
    /// # Errors
    ///
    /// [`MemError::Grid`] for an invalid grid, [`MemError::InvalidConfig`]
    /// for zero equations, zero ranks, or more ranks than cells along the
    /// decomposed axis.
    pub fn validate(&self) -> Result<Grid<D>, MemError> {
        let grid = Grid::new(self.extents)?;
        if self.n_eqns == 0 {
            return Err(MemError::InvalidConfig {
                reason: "at least one equation is required".into(),
            });
        }
        if self.n_ranks == 0 || self.n_ranks > self.extents[0] {
            return Err(MemError::InvalidConfig {
                reason: format!(
                    "{} ranks cannot share {} cells along axis 0",
                    self.n_ranks, self.extents[0]
                ),
            });
        }
        Ok(grid)
    }
}
