//! Thread concurrency layer.
//!
//! [`Threads`] owns the memory manager and one [`RankState`] per rank.
//! Axis 0 is split into contiguous slabs; each `advance` call runs one
//! [`SolverCore`] per slab on a scoped thread. Physical domain edges get
//! real boundary handles, internal seams get [`Shared`] ones, so every
//! rank reads its neighbours' interior straight from the shared arrays.
//!
//! # Ownership model
//!
//! `Threads` is [`Send`]. All mutating methods take `&mut self`, and the
//! accessors hand out `&Array` borrowed from `self`, so initial
//! conditions cannot be written while an `advance` is running.
//!
//! # Failure
//!
//! A rank that fails poisons the memory manager; its siblings leave
//! their next barrier with [`SolverError::Aborted`]. The poison is
//! permanent: every later `advance` returns `Aborted`.

use std::thread;
use std::time::Instant;

use advect_arena::{Array, Mem};
use advect_bcond::{BoundaryCondition, Cyclic, Open, Shared, Side};
use advect_core::{Rank, Real, StateReader};
use advect_grid::{decompose, Grid, Slabs};

use crate::config::{BcKind, ConfigError, FluxForm, SolverConfig};
use crate::core::{alloc, BcPair, RankState, SolverCore};
use crate::error::SolverError;
use crate::metrics::AdvanceMetrics;

// Compile-time assertion: Threads is Send for any element type.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Threads<f64, 3>>();
    }
};

/// Factory for boundary handles at physical domain edges.
///
/// Called once per `(rank, axis, side)` that touches the edge of the
/// global domain. Seams between ranks never reach the factory.
pub type BcFactory<'f, T, const D: usize> =
    dyn FnMut(Rank, usize, Side) -> Box<dyn BoundaryCondition<T, D>> + 'f;

// ── Threads ────────────────────────────────────────────────────────

/// Multi-threaded donor-cell solver over a slab decomposition.
///
/// `n_ranks == 1` is the serial mode and runs on the calling thread.
///
/// # Example
///
/// ```
/// use advect_solver::{SolverConfig, Threads};
///
/// let mut cfg = SolverConfig::new([20]);
/// cfg.n_ranks = 2;
/// let mut solver = Threads::<f64, 1>::new(cfg).unwrap();
/// solver.courant(0).unwrap().fill(0.5);
/// solver.advectee(0).unwrap().set([10], 1.0);
/// solver.advance(1).unwrap();
///
/// let psi = solver.state(0).unwrap();
/// assert_eq!(psi.get([10]), 0.5);
/// assert_eq!(psi.get([11]), 0.5);
/// ```
pub struct Threads<T: Real, const D: usize> {
    config: SolverConfig<D>,
    grid: Grid<D>,
    mem: Mem<T, D>,
    slabs: Slabs,
    ranks: Vec<RankState<T, D>>,
}

impl<T: Real, const D: usize> Threads<T, D> {
    /// Build a solver whose physical edges use the [`BcKind`]s of
    /// `config`.
    ///
    /// # Errors
    ///
    /// [`SolverError::Config`] for an invalid configuration, or
    /// allocation failures.
    pub fn new(config: SolverConfig<D>) -> Result<Self, SolverError> {
        let kinds = config.bcs;
        let grid = config.validate()?;
        let mut physical = |_: Rank, axis: usize, side: Side| -> Box<dyn BoundaryCondition<T, D>> {
            let n = grid.extent(axis);
            let kind = match side {
                Side::Left => kinds[axis][0],
                Side::Right => kinds[axis][1],
            };
            match kind {
                BcKind::Cyclic => Box::new(Cyclic::new(axis, side, n)),
                BcKind::Open => Box::new(Open::new(axis, side, n)),
            }
        };
        Self::with_boundaries(config, &mut physical)
    }

    /// Build a solver with caller-supplied handles at physical edges.
    ///
    /// The [`BcKind`]s of `config` are still validated but otherwise
    /// ignored.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`ConfigError::BoundaryMismatch`] if
    /// the factory returns a handle for another axis or side.
    pub fn with_boundaries(
        config: SolverConfig<D>,
        factory: &mut BcFactory<'_, T, D>,
    ) -> Result<Self, SolverError> {
        let grid = config.validate()?;
        let mut mem = Mem::new(&config.mem_config())?;
        alloc(&mut mem)?;
        let slabs = decompose(grid.extents()[0], config.n_ranks).map_err(ConfigError::from)?;
        log::debug!("decomposed axis 0 into {} slab(s): {:?}", slabs.len(), slabs);

        let last = slabs.len() - 1;
        let mut ranks = Vec::with_capacity(slabs.len());
        for (r, &slab) in slabs.iter().enumerate() {
            let rank = u32::try_from(r)
                .map(Rank)
                .map_err(|_| ConfigError::TooManyRanks {
                    n_ranks: slabs.len(),
                })?;
            let mut ijk = grid.interior();
            ijk[0] = slab;
            let mut bcs: Vec<BcPair<T, D>> = Vec::with_capacity(D);
            for axis in 0..D {
                let mut handle = |side: Side| -> Box<dyn BoundaryCondition<T, D>> {
                    let seam = axis == 0
                        && match side {
                            Side::Left => r != 0,
                            Side::Right => r != last,
                        };
                    if seam {
                        Box::new(Shared::new(axis, side))
                    } else {
                        factory(rank, axis, side)
                    }
                };
                bcs.push([handle(Side::Left), handle(Side::Right)]);
            }
            ranks.push(RankState::new(rank, &grid, ijk, bcs, config.n_eqns)?);
        }

        log::info!(
            "solver ready: grid {:?}, {} equation(s), {} rank(s), opts {}, {:?} fluxes",
            grid.extents(),
            config.n_eqns,
            ranks.len(),
            config.opts,
            config.flux_form
        );
        Ok(Self {
            config,
            grid,
            mem,
            slabs,
            ranks,
        })
    }

    /// Advance every equation by `nt` time steps.
    ///
    /// The first call also runs the ante-loop checks. Calls may be
    /// repeated; the step counter carries over.
    ///
    /// # Errors
    ///
    /// The first error of any rank other than [`SolverError::Aborted`];
    /// `Aborted` only if every failing rank was aborted.
    pub fn advance(&mut self, nt: u64) -> Result<(), SolverError> {
        if self.ranks.len() != self.slabs.len() || self.mem.is_poisoned() {
            return Err(SolverError::Aborted);
        }
        let t0 = Instant::now();
        let states = std::mem::take(&mut self.ranks);
        let flux_form = self.config.flux_form;
        let mem = &self.mem;

        let (restored, result) = if states.len() == 1 {
            let mut states = states;
            match states.pop() {
                Some(st) => {
                    let (st, r) = run_rank(mem, st, flux_form, nt);
                    (st.into_iter().collect(), r)
                }
                None => (Vec::new(), Err(SolverError::Aborted)),
            }
        } else {
            run_scoped(mem, states, flux_form, nt)
        };
        self.ranks = restored;

        match &result {
            Ok(()) => log::info!(
                "advanced {nt} step(s) to t={} in {} us",
                self.timestep(),
                t0.elapsed().as_micros()
            ),
            Err(e) => log::warn!("advance of {nt} step(s) failed: {e}"),
        }
        result
    }

    /// Current time level of equation `e`, read-only.
    pub fn state(&self, e: usize) -> Option<&Array<T, D>> {
        let n = self.ranks.first()?.n(e)?;
        self.mem.psi(e, n).ok()
    }

    /// Current time level of equation `e`, for setting initial values.
    pub fn advectee(&mut self, e: usize) -> Option<&Array<T, D>> {
        self.state(e)
    }

    /// Courant component along axis `d`, stored at faces.
    pub fn courant(&mut self, d: usize) -> Option<&Array<T, D>> {
        self.mem.gc(d).ok()
    }

    /// The metric array; present only with `Opts::NUG`.
    pub fn g_factor(&mut self) -> Option<&Array<T, D>> {
        self.mem.g_opt()
    }

    /// Completed time steps.
    pub fn timestep(&self) -> u64 {
        self.ranks.first().map_or(0, RankState::timestep)
    }

    /// Per-rank metrics, in rank order.
    pub fn metrics(&self) -> Vec<AdvanceMetrics> {
        self.ranks.iter().map(|r| r.metrics().clone()).collect()
    }

    /// Per-rank states, in rank order.
    pub fn ranks(&self) -> &[RankState<T, D>] {
        &self.ranks
    }

    /// The global grid.
    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    /// Slab of axis 0 owned by each rank.
    pub fn slabs(&self) -> &Slabs {
        &self.slabs
    }

    /// Grid spacing per axis.
    pub fn spacing(&self) -> [f64; D] {
        self.config.spacing
    }

    /// The configuration the solver was built from.
    pub fn config(&self) -> &SolverConfig<D> {
        &self.config
    }

    /// The shared memory manager.
    pub fn mem(&self) -> &Mem<T, D> {
        &self.mem
    }

    /// The shared memory manager, for allocating scratch groups.
    pub fn mem_mut(&mut self) -> &mut Mem<T, D> {
        &mut self.mem
    }
}

impl<T: Real, const D: usize> StateReader<T> for Threads<T, D> {
    fn n_eqns(&self) -> usize {
        self.config.n_eqns
    }

    fn read_state(&self, eqn: usize) -> Option<Vec<T>> {
        let interior = self.grid.interior();
        self.state(eqn).map(|a| a.to_vec(&interior))
    }

    fn timestep(&self) -> u64 {
        Threads::timestep(self)
    }
}

impl<T: Real, const D: usize> std::fmt::Debug for Threads<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Threads")
            .field("grid", &self.grid)
            .field("slabs", &self.slabs)
            .field("ranks", &self.ranks)
            .finish_non_exhaustive()
    }
}

// ── Rank execution ─────────────────────────────────────────────────

/// Poisons the memory manager if the owning thread unwinds.
struct PoisonOnPanic<'a, T: Real, const D: usize>(&'a Mem<T, D>);

impl<T: Real, const D: usize> Drop for PoisonOnPanic<'_, T, D> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.poison();
        }
    }
}

type RankOutcome<T, const D: usize> = (Option<RankState<T, D>>, Result<(), SolverError>);

fn run_rank<T: Real, const D: usize>(
    mem: &Mem<T, D>,
    st: RankState<T, D>,
    flux_form: FluxForm,
    nt: u64,
) -> RankOutcome<T, D> {
    let _guard = PoisonOnPanic(mem);
    match SolverCore::new(mem, st, flux_form) {
        Ok(mut core) => {
            let r = core.advance(nt);
            (Some(core.into_state()), r)
        }
        Err(e) => {
            mem.poison();
            (None, Err(e))
        }
    }
}

fn run_scoped<T: Real, const D: usize>(
    mem: &Mem<T, D>,
    states: Vec<RankState<T, D>>,
    flux_form: FluxForm,
    nt: u64,
) -> (Vec<RankState<T, D>>, Result<(), SolverError>) {
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(states.len());
        let mut spawn_err = None;
        for st in states {
            let rank = st.rank();
            let spawned = thread::Builder::new()
                .name(format!("advect-rank-{rank}"))
                .spawn_scoped(s, move || run_rank(mem, st, flux_form, nt));
            match spawned {
                Ok(h) => handles.push((rank, h)),
                Err(e) => {
                    mem.poison();
                    spawn_err = Some(SolverError::ThreadSpawnFailed {
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        let mut restored = Vec::with_capacity(handles.len());
        let mut errors = Vec::new();
        for (rank, h) in handles {
            match h.join() {
                Ok((st, r)) => {
                    restored.extend(st);
                    if let Err(e) = r {
                        errors.push(e);
                    }
                }
                Err(_) => {
                    log::error!("rank {rank} panicked");
                    errors.push(SolverError::RankPanicked { rank: rank.index() });
                }
            }
        }
        let result = match spawn_err {
            Some(e) => Err(e),
            None => first_cause(errors),
        };
        (restored, result)
    })
}

/// The root cause among rank errors: the first one that is not
/// [`SolverError::Aborted`].
fn first_cause(errors: Vec<SolverError>) -> Result<(), SolverError> {
    let mut aborted = false;
    for e in errors {
        if e == SolverError::Aborted {
            aborted = true;
        } else {
            return Err(e);
        }
    }
    if aborted {
        Err(SolverError::Aborted)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_core::Opts;

    #[test]
    fn seams_get_shared_handles() {
        let mut cfg = SolverConfig::new([9, 4]);
        cfg.n_ranks = 3;
        let t = Threads::<f64, 2>::new(cfg).unwrap();
        assert_eq!(t.slabs().len(), 3);
        let dbg = format!("{:?}", t.ranks()[1]);
        assert!(dbg.contains("shared[0:left]"), "{dbg}");
        assert!(dbg.contains("shared[0:right]"), "{dbg}");
        assert!(dbg.contains("cyclic[1:left]"), "{dbg}");
        let first = format!("{:?}", t.ranks()[0]);
        assert!(first.contains("cyclic[0:left]"), "{first}");
    }

    #[test]
    fn first_cause_prefers_root_error() {
        let root = SolverError::UnknownEquation { eqn: 7 };
        assert_eq!(
            first_cause(vec![SolverError::Aborted, root.clone()]),
            Err(root)
        );
        assert_eq!(first_cause(vec![SolverError::Aborted]), Err(SolverError::Aborted));
        assert_eq!(first_cause(Vec::new()), Ok(()));
    }

    #[test]
    fn g_factor_only_with_metric() {
        let mut t = Threads::<f64, 1>::new(SolverConfig::new([4])).unwrap();
        assert!(t.g_factor().is_none());
        let mut cfg = SolverConfig::new([4]);
        cfg.opts = Opts::NUG;
        let mut t = Threads::<f64, 1>::new(cfg).unwrap();
        assert_eq!(t.g_factor().unwrap().get([0]), 1.0);
    }

    #[test]
    fn invalid_config_rejected_before_allocation() {
        let mut cfg = SolverConfig::new([4]);
        cfg.n_eqns = 0;
        assert_eq!(
            Threads::<f32, 1>::new(cfg).unwrap_err(),
            SolverError::Config(ConfigError::NoEquations)
        );
    }

    #[test]
    fn poisoned_solver_stays_aborted() {
        let mut t = Threads::<f64, 1>::new(SolverConfig::new([4])).unwrap();
        t.mem().poison();
        assert_eq!(t.advance(1), Err(SolverError::Aborted));
        assert_eq!(t.timestep(), 0);
    }
}
