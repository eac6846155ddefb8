//! Solver configuration, validation, and error types.
//!
//! [`SolverConfig`] is the single input for building a solver.
//! [`validate()`](SolverConfig::validate) checks every structural
//! invariant before any array is allocated.

use std::error::Error;
use std::fmt;

use advect_arena::{MemConfig, MemError};
use advect_core::{Opt, Opts};
use advect_grid::{decompose, Grid, GridError};

// ── BcKind ─────────────────────────────────────────────────────────

/// Physical boundary kind for one side of one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BcKind {
    /// Periodic; must be set on both sides of an axis.
    Cyclic,
    /// Zero-gradient outflow.
    Open,
}

// ── FluxForm ───────────────────────────────────────────────────────

/// Which flux expression the update uses.
///
/// Chosen explicitly: the infinite-gauge form changes the mathematics of
/// the fluxes, so it is never inferred from the option set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FluxForm {
    /// Donor-cell fluxes `F(ψl, ψr, C)`.
    #[default]
    General,
    /// Signed face Courant numbers as fluxes. Requires [`Opts::IGA`] and
    /// is only meaningful where ψ is uniform.
    InfiniteGauge,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SolverConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Grid shape or decomposition is invalid.
    Grid(GridError),
    /// Memory configuration is invalid.
    Mem(MemError),
    /// No equations to advect.
    NoEquations,
    /// The infinite-gauge form was requested without [`Opts::IGA`].
    IgaNotEnabled,
    /// A grid spacing is NaN, infinite, zero, or negative.
    InvalidSpacing {
        /// The axis.
        axis: usize,
        /// The invalid value.
        value: f64,
    },
    /// A cyclic boundary on one side of an axis only.
    UnpairedCyclic {
        /// The axis.
        axis: usize,
    },
    /// A boundary handle was given for the wrong axis or side.
    BoundaryMismatch {
        /// Axis the handle was placed at.
        axis: usize,
        /// Name of the misplaced handle.
        name: String,
    },
    /// A rank's subdomain is empty or leaves the grid interior.
    SubdomainOutOfRange {
        /// The offending axis.
        axis: usize,
    },
    /// More ranks than a [`Rank`](advect_core::Rank) can number.
    TooManyRanks {
        /// The requested rank count.
        n_ranks: usize,
    },
    /// A rank state was built for a different number of equations.
    EquationCountMismatch {
        /// Equations in the memory manager.
        expected: usize,
        /// Equations in the rank state.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Mem(e) => write!(f, "memory: {e}"),
            Self::NoEquations => write!(f, "at least one equation is required"),
            Self::IgaNotEnabled => {
                write!(f, "infinite-gauge flux form requires the iga option")
            }
            Self::InvalidSpacing { axis, value } => {
                write!(f, "spacing along axis {axis} must be finite and positive, got {value}")
            }
            Self::UnpairedCyclic { axis } => {
                write!(f, "cyclic boundary on axis {axis} must be set on both sides")
            }
            Self::BoundaryMismatch { axis, name } => {
                write!(f, "boundary '{name}' placed at axis {axis} serves another slot")
            }
            Self::SubdomainOutOfRange { axis } => {
                write!(f, "subdomain along axis {axis} is empty or outside the grid")
            }
            Self::TooManyRanks { n_ranks } => {
                write!(f, "{n_ranks} ranks exceed the rank id range")
            }
            Self::EquationCountMismatch { expected, got } => {
                write!(f, "rank state tracks {got} equations, memory holds {expected}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Mem(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<MemError> for ConfigError {
    fn from(e: MemError) -> Self {
        Self::Mem(e)
    }
}

// ── SolverConfig ───────────────────────────────────────────────────

/// Complete configuration of a donor-cell solver run.
///
/// Immutable once handed to a solver.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig<const D: usize> {
    /// Cells per axis of the global domain.
    pub extents: [usize; D],
    /// Number of advected equations. Default: 1.
    pub n_eqns: usize,
    /// Number of threads; axis 0 is split into this many slabs. Default: 1.
    pub n_ranks: usize,
    /// Numerical options. Default: none.
    pub opts: Opts,
    /// Flux expression. Default: [`FluxForm::General`].
    pub flux_form: FluxForm,
    /// Grid spacing per axis, carried for collaborators. Default: 1.
    pub spacing: [f64; D],
    /// Boundary kind per axis, `[left, right]`. Default: cyclic.
    pub bcs: [[BcKind; 2]; D],
}

impl<const D: usize> SolverConfig<D> {
    /// Serial, single-equation, periodic configuration.
    pub fn new(extents: [usize; D]) -> Self {
        Self {
            extents,
            n_eqns: 1,
            n_ranks: 1,
            opts: Opts::empty(),
            flux_form: FluxForm::General,
            spacing: [1.0; D],
            bcs: [[BcKind::Cyclic; 2]; D],
        }
    }

    /// Validate all structural invariants and return the grid.
    ///
    /// # Errors
    ///
    /// The first violated invariant, as a [`ConfigError`].
    pub fn validate(&self) -> Result<Grid<D>, ConfigError> {
        // 1. Grid shape.
        let grid = Grid::new(self.extents)?;
        // 2. Something to advect.
        if self.n_eqns == 0 {
            return Err(ConfigError::NoEquations);
        }
        // 3. Every rank has an id and owns at least one slab cell.
        if u32::try_from(self.n_ranks).is_err() {
            return Err(ConfigError::TooManyRanks {
                n_ranks: self.n_ranks,
            });
        }
        decompose(self.extents[0], self.n_ranks)?;
        // 4. The flux form was opted into.
        if self.flux_form == FluxForm::InfiniteGauge && !self.opts.isset(Opt::Iga) {
            return Err(ConfigError::IgaNotEnabled);
        }
        // 5. Spacing.
        for (axis, &value) in self.spacing.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSpacing { axis, value });
            }
        }
        // 6. Periodicity is a property of the axis, not of one side.
        for (axis, [l, r]) in self.bcs.iter().enumerate() {
            if (*l == BcKind::Cyclic) != (*r == BcKind::Cyclic) {
                return Err(ConfigError::UnpairedCyclic { axis });
            }
        }
        Ok(grid)
    }

    /// Memory configuration implied by this solver configuration.
    pub fn mem_config(&self) -> MemConfig<D> {
        MemConfig {
            extents: self.extents,
            n_eqns: self.n_eqns,
            n_ranks: self.n_ranks,
            opts: self.opts,
        }
    }
}
