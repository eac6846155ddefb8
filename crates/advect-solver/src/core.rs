//! The halo-exchange solver core.
//!
//! A [`SolverCore`] drives one rank's subdomain through the fixed
//! synchronisation protocol around each donor-cell update:
//!
//! ```text
//! barrier → bcs[axis 0] → bcs[axis 1] → bcs[axis 2] → barrier
//! ```
//!
//! Edge-setting calls (`set_edges`, `save_edges`) skip the leading
//! barrier. The core never fills a ghost cell itself.
//!
//! # Orthogonal boxes
//!
//! When the handles of axis `a` run, the box they receive is widened by
//! the halo along every axis before `a` (whose ghosts are already in
//! place) and left at the interior along every axis after it. Along
//! the decomposed axis 0 it is widened only at physical domain edges.
//! Corner ghosts therefore come out consistent, and no two ranks write
//! the same ghost cell.

use std::fmt;
use std::time::Instant;

use advect_arena::{ArrVec, Array, Mem, MemError, Slot, N_KHN};
use advect_bcond::{BoundaryCondition, Side};
use advect_core::{BcError, Opt, Opts, Rank, Real, HALO, N_TLEV};
use advect_formulae::{div_tolerance, max_abs_div, op, op_iga, Fields};
use advect_grid::{Grid, Rng};

use crate::config::{ConfigError, FluxForm};
use crate::error::SolverError;
use crate::metrics::AdvanceMetrics;

/// Boundary handles of one axis, `[left, right]`.
pub type BcPair<T, const D: usize> = [Box<dyn BoundaryCondition<T, D>>; 2];

// ── ExchangePhase ──────────────────────────────────────────────────

/// What the core is currently doing; used in logs and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExchangePhase {
    /// Between collective operations.
    #[default]
    Idle,
    /// One-off checks before the first step.
    AnteLoop,
    /// Scalar halo exchange.
    Scalar,
    /// Courant components along their own axes.
    VectorAlong,
    /// Vector components across the other axes.
    VectorNormal,
    /// Pressure-like halo exchange.
    Pressure,
    /// Imposing edge values.
    SetEdges,
    /// Recording edge velocities.
    SaveEdges,
    /// Donor-cell update.
    Update,
}

impl fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AnteLoop => "ante-loop",
            Self::Scalar => "xchng-sclr",
            Self::VectorAlong => "xchng-vctr-alng",
            Self::VectorNormal => "xchng-vctr-nrml",
            Self::Pressure => "xchng-pres",
            Self::SetEdges => "set-edges",
            Self::SaveEdges => "save-edges",
            Self::Update => "advop",
        };
        f.write_str(s)
    }
}

// ── alloc ──────────────────────────────────────────────────────────

/// Allocate every array a donor-cell solver needs.
///
/// ψ for each equation and time level, one Courant component per axis
/// at face points, the metric iff [`Opts::NUG`] (initialised to one),
/// and the Kahan buffers of each equation iff [`Opts::KHN`]. All arrays
/// are owned by `mem`.
///
/// # Errors
///
/// Propagates allocation and slot-binding failures.
pub fn alloc<T: Real, const D: usize>(mem: &mut Mem<T, D>) -> Result<(), MemError> {
    let grid = *mem.grid();
    let opts = mem.opts();
    for eqn in 0..mem.n_eqns() {
        for tlev in 0..N_TLEV {
            mem.allocate_slot(Slot::Psi { eqn, tlev }, grid.sclr_shape())?;
        }
    }
    for axis in 0..D {
        mem.allocate_slot(Slot::Courant { axis }, grid.vctr_shape(axis))?;
    }
    if opts.isset(Opt::Nug) {
        mem.allocate_slot(Slot::Metric, grid.sclr_shape())?;
        mem.g()?.fill(T::one());
    }
    if opts.isset(Opt::Khn) {
        for eqn in 0..mem.n_eqns() {
            for k in 0..N_KHN {
                mem.allocate_slot(Slot::Kahan { eqn, k }, grid.sclr_shape())?;
            }
        }
    }
    log::info!(
        "alloc: {} arrays, {} bytes, grid {:?}, opts {}",
        mem.n_arrays(),
        mem.memory_bytes(),
        grid.extents(),
        opts
    );
    Ok(())
}

// ── RankState ──────────────────────────────────────────────────────

/// Everything one rank owns between `advance` calls.
///
/// The memory manager is shared; this is the per-rank remainder: the
/// subdomain, the boundary handles, the current time level of every
/// equation, and counters.
pub struct RankState<T: Real, const D: usize> {
    rank: Rank,
    ijk: [Rng; D],
    at_edge: [bool; 2],
    bcs: Vec<BcPair<T, D>>,
    n: Vec<usize>,
    timestep: u64,
    ante_done: bool,
    metrics: AdvanceMetrics,
}

impl<T: Real, const D: usize> RankState<T, D> {
    /// Build the state of `rank` owning interior box `ijk` of `grid`.
    ///
    /// `bcs[a]` holds the left and right handles of axis `a`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SubdomainOutOfRange`] if `ijk` is empty or leaves
    /// the interior, [`ConfigError::BoundaryMismatch`] if a handle
    /// reports a different axis or side than its slot.
    pub fn new(
        rank: Rank,
        grid: &Grid<D>,
        ijk: [Rng; D],
        bcs: Vec<BcPair<T, D>>,
        n_eqns: usize,
    ) -> Result<Self, ConfigError> {
        let interior = grid.interior();
        for axis in 0..D {
            if ijk[axis].is_empty() || !interior[axis].covers(ijk[axis]) {
                return Err(ConfigError::SubdomainOutOfRange { axis });
            }
        }
        if bcs.len() != D {
            return Err(ConfigError::BoundaryMismatch {
                axis: bcs.len().min(D),
                name: format!("{} handle pairs", bcs.len()),
            });
        }
        for (axis, pair) in bcs.iter().enumerate() {
            for (bc, side) in pair.iter().zip(Side::BOTH) {
                if bc.axis() != axis || bc.side() != side {
                    return Err(ConfigError::BoundaryMismatch {
                        axis,
                        name: bc.name().to_owned(),
                    });
                }
            }
        }
        let at_edge = [
            ijk[0].first() == interior[0].first(),
            ijk[0].last() == interior[0].last(),
        ];
        Ok(Self {
            rank,
            ijk,
            at_edge,
            bcs,
            n: vec![0; n_eqns],
            timestep: 0,
            ante_done: false,
            metrics: AdvanceMetrics::default(),
        })
    }

    /// The rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Interior box owned by the rank.
    pub fn ijk(&self) -> &[Rng; D] {
        &self.ijk
    }

    /// Current time level of equation `e`.
    pub fn n(&self, e: usize) -> Option<usize> {
        self.n.get(e).copied()
    }

    /// Completed time steps.
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Accumulated metrics.
    pub fn metrics(&self) -> &AdvanceMetrics {
        &self.metrics
    }
}

impl<T: Real, const D: usize> fmt::Debug for RankState<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<[&str; 2]> = self
            .bcs
            .iter()
            .map(|[l, r]| [l.name(), r.name()])
            .collect();
        f.debug_struct("RankState")
            .field("rank", &self.rank)
            .field("ijk", &self.ijk)
            .field("bcs", &names)
            .field("n", &self.n)
            .field("timestep", &self.timestep)
            .finish()
    }
}

// ── SolverCore ─────────────────────────────────────────────────────

/// One rank's view of a donor-cell solver over a shared [`Mem`].
///
/// All collective methods must be called in the same order on every
/// rank. If any of them fails on one rank, that rank poisons the memory
/// manager so the others leave their next barrier with
/// [`SolverError::Aborted`] instead of waiting forever.
pub struct SolverCore<'m, T: Real, const D: usize> {
    mem: &'m Mem<T, D>,
    st: RankState<T, D>,
    opts: Opts,
    flux_form: FluxForm,
    phase: ExchangePhase,
}

impl<'m, T: Real, const D: usize> SolverCore<'m, T, D> {
    /// Attach a rank state to a memory manager.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IgaNotEnabled`] for an infinite-gauge core without
    /// the option, [`ConfigError::EquationCountMismatch`] if the state
    /// tracks a different number of equations than `mem` holds.
    pub fn new(
        mem: &'m Mem<T, D>,
        state: RankState<T, D>,
        flux_form: FluxForm,
    ) -> Result<Self, SolverError> {
        let opts = mem.opts();
        if flux_form == FluxForm::InfiniteGauge && !opts.isset(Opt::Iga) {
            return Err(ConfigError::IgaNotEnabled.into());
        }
        if state.n.len() != mem.n_eqns() {
            return Err(ConfigError::EquationCountMismatch {
                expected: mem.n_eqns(),
                got: state.n.len(),
            }
            .into());
        }
        Ok(Self {
            mem,
            st: state,
            opts,
            flux_form,
            phase: ExchangePhase::Idle,
        })
    }

    /// Detach the rank state for reuse in a later run.
    pub fn into_state(self) -> RankState<T, D> {
        self.st
    }

    /// The rank state.
    pub fn state(&self) -> &RankState<T, D> {
        &self.st
    }

    /// The shared memory manager.
    pub fn mem(&self) -> &'m Mem<T, D> {
        self.mem
    }

    /// Current phase.
    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    /// Completed time steps.
    pub fn timestep(&self) -> u64 {
        self.st.timestep
    }

    fn level(&self, e: usize) -> Result<usize, SolverError> {
        self.st
            .n
            .get(e)
            .copied()
            .ok_or(SolverError::UnknownEquation { eqn: e })
    }

    fn guard<R>(&mut self, r: Result<R, SolverError>) -> Result<R, SolverError> {
        if let Err(e) = &r {
            if *e != SolverError::Aborted {
                log::error!(
                    "rank {}: {} failed: {e}",
                    self.st.rank,
                    self.phase
                );
                self.mem.poison();
            }
        }
        self.phase = ExchangePhase::Idle;
        r
    }

    fn barrier(&mut self) -> Result<(), SolverError> {
        self.st.metrics.barriers += 1;
        self.mem.barrier().map_err(SolverError::from)
    }

    /// Orthogonal box for the handles of `axis`.
    fn ortho(&self, axis: usize, ranges: &[Rng; D]) -> [Rng; D] {
        let mut bx = *ranges;
        for (b, r) in bx.iter_mut().enumerate().take(axis) {
            *r = if b == 0 {
                let [lo, hi] = self.st.at_edge;
                r.ext_by(HALO * i32::from(lo), HALO * i32::from(hi))
            } else {
                r.ext(HALO)
            };
        }
        bx
    }

    fn each_bc(
        &mut self,
        axis: usize,
        mut f: impl FnMut(&mut dyn BoundaryCondition<T, D>) -> Result<(), BcError>,
    ) -> Result<(), SolverError> {
        let (rank, phase) = (self.st.rank, self.phase);
        for bc in self.st.bcs[axis].iter_mut() {
            self.st.metrics.bc_calls += 1;
            log::trace!("rank {rank}: {phase} {}", bc.name());
            f(bc.as_mut()).map_err(|reason| SolverError::Boundary {
                name: bc.name().to_owned(),
                reason,
            })?;
        }
        Ok(())
    }

    // ── Exchanges ───────────────────────────────────────────────

    fn fill_sclr_like(
        &mut self,
        arr: &Array<T, D>,
        ranges: &[Rng; D],
        deriv: bool,
        phase: ExchangePhase,
    ) -> Result<(), SolverError> {
        self.phase = phase;
        self.barrier()?;
        for a in 0..D {
            let ortho = self.ortho(a, ranges);
            if phase == ExchangePhase::Pressure {
                self.each_bc(a, |bc| bc.fill_halos_pres(arr, &ortho))?;
            } else {
                self.each_bc(a, |bc| bc.fill_halos_sclr(arr, &ortho, deriv))?;
            }
        }
        self.barrier()
    }

    fn vctr_alng(&mut self, arrvec: &ArrVec<'_, T, D>) -> Result<(), SolverError> {
        self.phase = ExchangePhase::VectorAlong;
        self.barrier()?;
        let ortho = self.st.ijk;
        for a in 0..D {
            self.each_bc(a, |bc| bc.fill_halos_vctr_alng(arrvec, &ortho))?;
        }
        self.barrier()
    }

    fn vctr_nrml(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ranges: &[Rng; D],
    ) -> Result<(), SolverError> {
        self.phase = ExchangePhase::VectorNormal;
        self.barrier()?;
        for (comp, &arr) in arrvec.iter().enumerate() {
            for a in (0..D).filter(|&a| a != comp) {
                let mut ortho = self.ortho(a, ranges);
                ortho[comp] = ranges[comp];
                self.each_bc(a, |bc| bc.fill_halos_vctr_nrml(arr, &ortho))?;
            }
        }
        self.barrier()
    }

    fn xchng_level(&mut self, e: usize) -> Result<(), SolverError> {
        let mem = self.mem;
        let arr = mem.psi(e, self.level(e)?)?;
        let ijk = self.st.ijk;
        self.fill_sclr_like(arr, &ijk, false, ExchangePhase::Scalar)
    }

    /// Fill the scalar halo of `arr` around `ranges`.
    ///
    /// `ranges` is the rank-local box whose ghosts are wanted, normally
    /// the rank's interior. With `deriv`, handles may treat the field as
    /// a derivative.
    ///
    /// # Errors
    ///
    /// [`SolverError::Boundary`] if a handle fails, or
    /// [`SolverError::Aborted`] if another rank did.
    pub fn xchng_sclr(
        &mut self,
        arr: &Array<T, D>,
        ranges: &[Rng; D],
        deriv: bool,
    ) -> Result<(), SolverError> {
        let r = self.fill_sclr_like(arr, ranges, deriv, ExchangePhase::Scalar);
        self.guard(r)
    }

    /// Fill the halo of ψ at the current time level of equation `e`.
    ///
    /// # Errors
    ///
    /// As [`xchng_sclr`](Self::xchng_sclr), plus
    /// [`SolverError::UnknownEquation`].
    pub fn xchng(&mut self, e: usize) -> Result<(), SolverError> {
        let r = self.xchng_level(e);
        self.guard(r)
    }

    /// Fill the ghost faces of each vector component along its own axis.
    ///
    /// # Errors
    ///
    /// As [`xchng_sclr`](Self::xchng_sclr).
    pub fn xchng_vctr_alng(&mut self, arrvec: &ArrVec<'_, T, D>) -> Result<(), SolverError> {
        let r = self.vctr_alng(arrvec);
        self.guard(r)
    }

    /// Fill the ghost cells of each vector component across the other
    /// axes. `ranges[d]` bounds component `d` along its own axis.
    ///
    /// # Errors
    ///
    /// As [`xchng_sclr`](Self::xchng_sclr).
    pub fn xchng_vctr_nrml(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ranges: &[Rng; D],
    ) -> Result<(), SolverError> {
        let r = self.vctr_nrml(arrvec, ranges);
        self.guard(r)
    }

    /// Fill the halo of a pressure-like field.
    ///
    /// # Errors
    ///
    /// As [`xchng_sclr`](Self::xchng_sclr).
    pub fn xchng_pres(&mut self, arr: &Array<T, D>, ranges: &[Rng; D]) -> Result<(), SolverError> {
        let r = self.fill_sclr_like(arr, ranges, false, ExchangePhase::Pressure);
        self.guard(r)
    }

    /// Impose edge values: the handles of axis `a` act on `arrs[a]`.
    /// Ends with a barrier; there is no leading one.
    ///
    /// # Errors
    ///
    /// As [`xchng_sclr`](Self::xchng_sclr).
    pub fn set_edges(
        &mut self,
        arrs: &ArrVec<'_, T, D>,
        ranges: &[Rng; D],
        sign: i32,
    ) -> Result<(), SolverError> {
        self.phase = ExchangePhase::SetEdges;
        let mut r = Ok(());
        for (a, &arr) in arrs.iter().enumerate() {
            r = self.each_bc(a, |bc| bc.set_edge_pres(arr, ranges, sign));
            if r.is_err() {
                break;
            }
        }
        let r = r.and_then(|()| self.barrier());
        self.guard(r)
    }

    /// Let the handles record edge velocities: the handles of axis `a`
    /// see `arrs[a]`. Ends with a barrier; there is no leading one.
    ///
    /// # Errors
    ///
    /// As [`xchng_sclr`](Self::xchng_sclr).
    pub fn save_edges(
        &mut self,
        arrs: &ArrVec<'_, T, D>,
        ranges: &[Rng; D],
    ) -> Result<(), SolverError> {
        self.phase = ExchangePhase::SaveEdges;
        let mut r = Ok(());
        for (a, &arr) in arrs.iter().enumerate() {
            r = self.each_bc(a, |bc| bc.save_edge_vel(arr, ranges));
            if r.is_err() {
                break;
            }
        }
        let r = r.and_then(|()| self.barrier());
        self.guard(r)
    }

    // ── Ante loop ───────────────────────────────────────────────

    fn ante_loop(&mut self) -> Result<(), SolverError> {
        let t0 = Instant::now();
        let mem = self.mem;
        let gc = mem.gc_set()?;
        self.vctr_alng(&gc)?;
        self.phase = ExchangePhase::AnteLoop;

        let rank = self.st.rank.index();
        let ijk = self.st.ijk;
        if self.opts.isset(Opt::Nug) {
            let local = mem.g()?.min(&ijk).map_or(f64::INFINITY, Real::as_f64);
            // The global minimum is the negated maximum of negated minima.
            self.st.metrics.barriers += 2;
            let min = -mem.reduce_max(rank, -local)?;
            if min.is_nan() || min <= 0.0 {
                return Err(SolverError::NonPositiveMetric { min });
            }
        }
        if !self.opts.isset(Opt::Dfl) {
            let local = max_abs_div(&gc, &ijk).as_f64();
            self.st.metrics.barriers += 2;
            let global = mem.reduce_max(rank, local)?;
            let tolerance = div_tolerance::<T>().as_f64();
            log::debug!(
                "rank {}: courant divergence local {local:e}, global {global:e}, tolerance {tolerance:e}",
                self.st.rank
            );
            if global.is_nan() || global > tolerance {
                return Err(SolverError::DivergentCourant {
                    max_abs_div: global,
                    tolerance,
                });
            }
        }
        self.st.ante_done = true;
        self.st.metrics.ante_loop_us += elapsed_us(t0);
        Ok(())
    }

    /// One-off checks before the first step: Courant halo exchange,
    /// strictly positive metric (with [`Opts::NUG`]), and zero discrete
    /// divergence of the Courant field within one `ε` (unless
    /// [`Opts::DFL`]).
    ///
    /// Called by [`advance`](Self::advance) once per solver lifetime.
    ///
    /// # Errors
    ///
    /// [`SolverError::NonPositiveMetric`], [`SolverError::DivergentCourant`],
    /// and exchange errors. Every rank reaches the same verdict.
    pub fn hook_ante_loop(&mut self) -> Result<(), SolverError> {
        let r = self.ante_loop();
        self.guard(r)
    }

    // ── Update ──────────────────────────────────────────────────

    fn update(&mut self, e: usize) -> Result<(), SolverError> {
        self.phase = ExchangePhase::Update;
        let mem = self.mem;
        let fields = Fields {
            psi: mem.psi_set(e).map_err(|_| SolverError::UnknownEquation { eqn: e })?,
            n: self.level(e)?,
            gc: mem.gc_set()?,
            g: if self.opts.isset(Opt::Nug) {
                Some(mem.g()?)
            } else {
                None
            },
            khn: if self.opts.isset(Opt::Khn) {
                Some(mem.khn(e)?)
            } else {
                None
            },
        };
        match self.flux_form {
            FluxForm::General => op(self.opts, &fields, &self.st.ijk),
            FluxForm::InfiniteGauge => op_iga(self.opts, &fields, &self.st.ijk),
        }
        Ok(())
    }

    /// Donor-cell update of equation `e` over the rank's interior,
    /// writing the next time level. Halos must be filled.
    ///
    /// # Errors
    ///
    /// [`SolverError::UnknownEquation`] or missing storage.
    pub fn advop(&mut self, e: usize) -> Result<(), SolverError> {
        let r = self.update(e);
        self.guard(r)
    }

    /// Rotate the time-level index of equation `e`.
    ///
    /// # Errors
    ///
    /// [`SolverError::UnknownEquation`].
    pub fn cycle(&mut self, e: usize) -> Result<(), SolverError> {
        let n = self.level(e)?;
        self.st.n[e] = (n + 1) % N_TLEV;
        Ok(())
    }

    fn run(&mut self, nt: u64) -> Result<(), SolverError> {
        if !self.st.ante_done {
            self.ante_loop()?;
        }
        let n_eqns = self.st.n.len();
        for _ in 0..nt {
            let t0 = Instant::now();
            for e in 0..n_eqns {
                self.xchng_level(e)?;
            }
            let t1 = Instant::now();
            for e in 0..n_eqns {
                self.update(e)?;
            }
            let t2 = Instant::now();
            for e in 0..n_eqns {
                self.cycle(e)?;
            }
            self.barrier()?;
            self.st.timestep += 1;

            let m = &mut self.st.metrics;
            m.exchange_us += duration_us(t1 - t0);
            m.advop_us += duration_us(t2 - t1);
            m.last_step_us = elapsed_us(t0);
            m.steps += 1;
        }
        Ok(())
    }

    /// Advance every equation by `nt` steps.
    ///
    /// Runs [`hook_ante_loop`](Self::hook_ante_loop) first if it has not
    /// run yet. Per step: exchange every equation, update every
    /// equation, rotate every time level, barrier. May be called
    /// repeatedly; the step counter carries over.
    ///
    /// # Errors
    ///
    /// The first failure of any phase.
    pub fn advance(&mut self, nt: u64) -> Result<(), SolverError> {
        log::debug!(
            "rank {}: advance {nt} step(s) from t={}",
            self.st.rank,
            self.st.timestep
        );
        let r = self.run(nt);
        self.guard(r)
    }
}

fn duration_us(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

fn elapsed_us(t0: Instant) -> u64 {
    duration_us(t0.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_arena::MemConfig;
    use advect_bcond::{Cyclic, Open};

    fn cyclic_bcs<const D: usize>(grid: &Grid<D>) -> Vec<BcPair<f64, D>> {
        (0..D)
            .map(|a| {
                let n = grid.extent(a);
                [
                    Box::new(Cyclic::new(a, Side::Left, n)) as Box<dyn BoundaryCondition<f64, D>>,
                    Box::new(Cyclic::new(a, Side::Right, n)),
                ]
            })
            .collect()
    }

    fn serial<const D: usize>(extents: [usize; D], opts: Opts) -> Mem<f64, D> {
        let mut cfg = MemConfig::new(extents, 1);
        cfg.opts = opts;
        let mut mem = Mem::new(&cfg).unwrap();
        alloc(&mut mem).unwrap();
        mem
    }

    fn core<const D: usize>(mem: &Mem<f64, D>) -> SolverCore<'_, f64, D> {
        let grid = *mem.grid();
        let st = RankState::new(Rank(0), &grid, grid.interior(), cyclic_bcs(&grid), 1).unwrap();
        SolverCore::new(mem, st, FluxForm::General).unwrap()
    }

    #[test]
    fn alloc_respects_options() {
        let plain = serial([4, 4], Opts::empty());
        assert_eq!(plain.n_arrays(), 2 + 2);
        assert!(plain.g_opt().is_none());

        let full = serial([4, 4], Opts::NUG | Opts::KHN);
        assert_eq!(full.n_arrays(), 2 + 2 + 1 + 3);
        assert_eq!(full.g().unwrap().get([0, 0]), 1.0);
        assert!(full.khn(0).is_ok());
        assert!(full.khn(1).is_err());
    }

    #[test]
    fn xchng_fills_corners_consistently() {
        let mem = serial([3, 4], Opts::empty());
        let psi = mem.psi(0, 0).unwrap();
        psi.fill_with(&mem.grid().interior(), |[i, j]| f64::from(10 * i + j));
        let mut c = core(&mem);
        c.xchng(0).unwrap();
        // Edges.
        assert_eq!(psi.get([-1, 2]), 22.0);
        assert_eq!(psi.get([3, 1]), 1.0);
        assert_eq!(psi.get([1, -1]), 13.0);
        assert_eq!(psi.get([1, 4]), 10.0);
        // Corners wrap on both axes.
        assert_eq!(psi.get([-1, -1]), 23.0);
        assert_eq!(psi.get([3, 4]), 0.0);
        assert_eq!(c.phase(), ExchangePhase::Idle);
    }

    #[test]
    fn ortho_widens_only_earlier_axes() {
        let mem = serial([5, 6, 7], Opts::empty());
        let c = core(&mem);
        let r = mem.grid().interior();
        assert_eq!(c.ortho(0, &r), r);
        assert_eq!(c.ortho(1, &r), [Rng::new(-1, 5), r[1], r[2]]);
        assert_eq!(c.ortho(2, &r), [Rng::new(-1, 5), Rng::new(-1, 6), r[2]]);
    }

    #[test]
    fn rank_state_rejects_misplaced_handle() {
        let grid = Grid::new([4]).unwrap();
        let bcs: Vec<BcPair<f64, 1>> = vec![[
            Box::new(Cyclic::new(0, Side::Right, 4)),
            Box::new(Cyclic::new(0, Side::Right, 4)),
        ]];
        let err = RankState::new(Rank(0), &grid, grid.interior(), bcs, 1).unwrap_err();
        assert!(matches!(err, ConfigError::BoundaryMismatch { axis: 0, .. }));
    }

    #[test]
    fn rank_state_rejects_subdomain_outside_grid() {
        let grid = Grid::new([4]).unwrap();
        let err =
            RankState::new(Rank(0), &grid, [Rng::new(2, 4)], cyclic_bcs(&grid), 1).unwrap_err();
        assert_eq!(err, ConfigError::SubdomainOutOfRange { axis: 0 });
    }

    #[test]
    fn divergent_courant_rejected_before_first_step() {
        let mem = serial([6], Opts::empty());
        mem.gc(0).unwrap().fill_with(&[Rng::new(-1, 5)], |[i]| if i < 2 { 0.5 } else { 0.1 });
        let mut c = core(&mem);
        let err = c.advance(1).unwrap_err();
        assert!(matches!(err, SolverError::DivergentCourant { .. }));
        assert_eq!(c.timestep(), 0);
    }

    #[test]
    fn dfl_skips_divergence_check() {
        let mem = serial([6], Opts::DFL);
        mem.gc(0).unwrap().fill_with(&[Rng::new(-1, 5)], |[i]| if i < 2 { 0.5 } else { 0.1 });
        let mut c = core(&mem);
        c.advance(1).unwrap();
        assert_eq!(c.timestep(), 1);
    }

    #[test]
    fn non_positive_metric_rejected() {
        let mem = serial([4], Opts::NUG);
        mem.g().unwrap().set([2], 0.0);
        let mut c = core(&mem);
        assert_eq!(
            c.hook_ante_loop(),
            Err(SolverError::NonPositiveMetric { min: 0.0 })
        );
    }

    #[test]
    fn cycle_rotates_and_advance_counts() {
        let mem = serial([5], Opts::empty());
        mem.gc(0).unwrap().fill(0.5);
        let mut c = core(&mem);
        c.advance(3).unwrap();
        assert_eq!(c.timestep(), 3);
        assert_eq!(c.state().n(0), Some(1));
        c.advance(2).unwrap();
        assert_eq!(c.timestep(), 5);
        assert_eq!(c.state().n(0), Some(1));
        assert_eq!(c.state().metrics().steps, 5);
    }

    #[test]
    fn set_edges_uses_open_handles() {
        let mem = serial([4], Opts::empty());
        let grid = *mem.grid();
        let bcs: Vec<BcPair<f64, 1>> = vec![[
            Box::new(Open::new(0, Side::Left, 4)),
            Box::new(Open::new(0, Side::Right, 4)),
        ]];
        let st = RankState::new(Rank(0), &grid, grid.interior(), bcs, 1).unwrap();
        let mut c = SolverCore::new(&mem, st, FluxForm::General).unwrap();
        let p = mem.psi(0, 0).unwrap();
        p.fill_with(&grid.interior(), |[i]| f64::from(i + 1));
        c.set_edges(&[p], &grid.interior(), -1).unwrap();
        assert_eq!(p.get([-1]), -1.0);
        assert_eq!(p.get([4]), -4.0);
        c.save_edges(&[p], &grid.interior()).unwrap();
    }

    #[test]
    fn iga_core_requires_option() {
        let mem = serial([4], Opts::empty());
        let grid = *mem.grid();
        let st = RankState::new(Rank(0), &grid, grid.interior(), cyclic_bcs(&grid), 1).unwrap();
        let err = SolverCore::new(&mem, st, FluxForm::InfiniteGauge).err().unwrap();
        assert_eq!(err, SolverError::Config(ConfigError::IgaNotEnabled));
    }

    #[test]
    fn unknown_equation_reported() {
        let mem = serial([4], Opts::empty());
        let mut c = core(&mem);
        assert_eq!(c.cycle(3), Err(SolverError::UnknownEquation { eqn: 3 }));
    }
}
