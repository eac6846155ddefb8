//! Benchmark profiles for the advect donor-cell solver.
//!
//! Provides pre-built [`SolverConfig`] profiles and initial conditions:
//!
//! - [`reference_profile`]: 128x128 periodic grid (16K cells)
//! - [`stress_profile`]: 48x48x48 periodic grid (~110K cells)
//! - [`prepare`]: a solver with a Gaussian bump in a uniform flow

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use advect_core::Opts;
use advect_solver::{SolverConfig, SolverError, Threads};
use advect_test_utils::{fill_from, fill_uniform_courant, gaussian};

/// Build a reference benchmark profile: 128x128 grid (16K cells).
pub fn reference_profile(n_ranks: usize, opts: Opts) -> SolverConfig<2> {
    let mut cfg = SolverConfig::new([128, 128]);
    cfg.n_ranks = n_ranks;
    cfg.opts = opts;
    cfg
}

/// Build a stress benchmark profile: 48x48x48 grid (~110K cells).
pub fn stress_profile(n_ranks: usize, opts: Opts) -> SolverConfig<3> {
    let mut cfg = SolverConfig::new([48, 48, 48]);
    cfg.n_ranks = n_ranks;
    cfg.opts = opts;
    cfg
}

/// Build a solver from `config` with a Gaussian bump at the centre of
/// the domain in a uniform flow of Courant number `courant` per axis.
pub fn prepare<const D: usize>(
    config: SolverConfig<D>,
    courant: [f64; D],
) -> Result<Threads<f64, D>, SolverError> {
    let centre = config.extents.map(|n| n as f64 / 2.0);
    let width = config.extents[0] as f64 / 8.0;
    let mut solver = Threads::new(config)?;
    fill_uniform_courant(&solver.mem().gc_set()?, courant);
    let interior = solver.grid().interior();
    if let Some(psi) = solver.advectee(0) {
        fill_from(psi, &interior, gaussian(centre, width));
    }
    Ok(solver)
}
