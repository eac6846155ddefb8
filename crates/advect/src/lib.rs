//! Advect: explicit donor-cell advection on Arakawa-C grids.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! advect sub-crates. For most users, adding `advect` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use advect::prelude::*;
//!
//! // 1-D periodic domain of 20 cells, split between two threads.
//! let mut config = SolverConfig::new([20]);
//! config.n_ranks = 2;
//! let mut solver = Threads::<f64, 1>::new(config).unwrap();
//!
//! // Uniform flow to the right at half a cell per step; a unit step at 10.
//! solver.courant(0).unwrap().fill(0.5);
//! solver.advectee(0).unwrap().set([10], 1.0);
//! solver.advance(1).unwrap();
//!
//! let psi = solver.read_state(0).unwrap();
//! assert_eq!(psi.iter().sum::<f64>(), 1.0);
//! assert_eq!((psi[10], psi[11]), (0.5, 0.5));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `advect-core` | `Real`, option set, ids, `StateReader` |
//! | [`grid`] | `advect-grid` | Index ranges, staggering, permutation, decomposition |
//! | [`arena`] | `advect-arena` | Shared arrays, memory manager, barrier |
//! | [`formulae`] | `advect-formulae` | Flux, pairwise/Kahan sums, update kernels |
//! | [`bcond`] | `advect-bcond` | Boundary-condition trait and implementations |
//! | [`solver`] | `advect-solver` | Solver core, configuration, threads |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`advect-core`).
///
/// Contains the [`types::Real`] scalar trait, the [`types::Opts`] option
/// set, and the [`types::StateReader`] output trait.
pub use advect_core as types;

/// Grid indexing (`advect-grid`).
///
/// [`grid::Rng`] ranges with the [`grid::H`] half-index marker, the axis
/// permutation [`grid::pi`], and slab [`grid::decompose`].
pub use advect_grid as grid;

/// Shared arrays and the memory manager (`advect-arena`).
///
/// Most users only need [`arena::Array`] from this module; it is also
/// available in the [`prelude`].
pub use advect_arena as arena;

/// Donor-cell flux and update formulae (`advect-formulae`).
///
/// The dimension-generic [`formulae::op`] and its `op_1d`/`op_2d`/`op_3d`
/// entry points, with `_iga` variants.
pub use advect_formulae as formulae;

/// Boundary conditions (`advect-bcond`).
///
/// The [`bcond::BoundaryCondition`] trait is the main extension point for
/// user-defined boundaries.
pub use advect_bcond as bcond;

/// The halo-exchange solver (`advect-solver`).
///
/// [`solver::Threads`] for complete runs, [`solver::SolverCore`] for
/// driving a single rank by hand.
pub use advect_solver as solver;

/// Common imports for typical advect usage.
///
/// ```rust
/// use advect::prelude::*;
/// ```
///
/// This imports the most frequently used types: the solver and its
/// configuration, the option set, index ranges, arrays, and the
/// boundary-condition trait.
pub mod prelude {
    // Core types and traits
    pub use advect_core::{Opt, Opts, Rank, Real, StateReader};

    // Grid
    pub use advect_grid::{Grid, Rng, H};

    // Arrays
    pub use advect_arena::{ArrVec, Array};

    // Boundary conditions
    pub use advect_bcond::{BoundaryCondition, Cyclic, Open, Side};

    // Errors
    pub use advect_core::BcError;
    pub use advect_solver::{ConfigError, SolverError};

    // Solver
    pub use advect_solver::{
        AdvanceMetrics, BcKind, FluxForm, SolverConfig, SolverCore, Threads,
    };
}
