//! The memory manager: array registry, typed slots, and rank sync.

use std::fmt;

use indexmap::IndexMap;

use advect_core::{ArrayId, Opts, Real, N_TLEV};
use advect_grid::{Grid, Rng};

use crate::array::{ArrVec, Array};
use crate::config::MemConfig;
use crate::error::MemError;
use crate::sync::RankSync;

/// Number of Kahan buffers per equation: last increment, corrected
/// increment, and the compensation carried into the next step.
pub const N_KHN: usize = 3;

/// A typed role an allocated array can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Advectee `eqn` at time level `tlev`.
    Psi {
        /// Equation index.
        eqn: usize,
        /// Time-level index, `0..N_TLEV`.
        tlev: usize,
    },
    /// Courant component normal to `axis`.
    Courant {
        /// Axis index.
        axis: usize,
    },
    /// The metric (gauge) factor `G`.
    Metric,
    /// One of the Kahan buffers of equation `eqn`.
    Kahan {
        /// Equation index.
        eqn: usize,
        /// Buffer index, `0..N_KHN`.
        k: usize,
    },
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Psi { eqn, tlev } => write!(f, "psi[{eqn}][{tlev}]"),
            Self::Courant { axis } => write!(f, "gc[{axis}]"),
            Self::Metric => f.write_str("G"),
            Self::Kahan { eqn, k } => write!(f, "khn[{eqn}][{k}]"),
        }
    }
}

/// Owner of every array used by one run.
///
/// Arrays are created with [`allocate`](Mem::allocate), which records
/// them in an append-only registry, and then bound to a [`Slot`]. After
/// allocation the manager is shared immutably by all ranks; element
/// writes go through the arrays' interior mutability.
pub struct Mem<T: Real, const D: usize> {
    grid: Grid<D>,
    opts: Opts,
    n_eqns: usize,
    arrays: Vec<Array<T, D>>,
    psi: Vec<[Option<ArrayId>; N_TLEV]>,
    gc: [Option<ArrayId>; D],
    g: Option<ArrayId>,
    khn: Vec<[Option<ArrayId>; N_KHN]>,
    tmp: IndexMap<String, Vec<Vec<ArrayId>>>,
    sync: RankSync,
}

impl<T: Real, const D: usize> Mem<T, D> {
    /// Create an empty memory manager for a validated configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`MemConfig::validate`] failures.
    pub fn new(config: &MemConfig<D>) -> Result<Self, MemError> {
        let grid = config.validate()?;
        Ok(Self {
            grid,
            opts: config.opts,
            n_eqns: config.n_eqns,
            arrays: Vec::new(),
            psi: vec![[None; N_TLEV]; config.n_eqns],
            gc: [None; D],
            g: None,
            khn: vec![[None; N_KHN]; config.n_eqns],
            tmp: IndexMap::new(),
            sync: RankSync::new(config.n_ranks),
        })
    }

    /// The global grid.
    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    /// Numerical options this memory was configured for.
    pub fn opts(&self) -> Opts {
        self.opts
    }

    /// Number of advected equations.
    pub fn n_eqns(&self) -> usize {
        self.n_eqns
    }

    /// Number of cooperating ranks.
    pub fn n_ranks(&self) -> usize {
        self.sync.n_ranks()
    }

    /// Number of arrays allocated so far.
    pub fn n_arrays(&self) -> usize {
        self.arrays.len()
    }

    /// Bytes of element storage across every array.
    pub fn memory_bytes(&self) -> usize {
        self.arrays.iter().map(Array::memory_bytes).sum()
    }

    // ── Allocation ──────────────────────────────────────────────

    /// Allocate a zero-filled array over `shape` and record ownership.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::ShapeOverflow`] for an unrepresentable shape
    /// and [`MemError::InvalidConfig`] once the id space is exhausted.
    pub fn allocate(&mut self, shape: [Rng; D]) -> Result<ArrayId, MemError> {
        let id = next_id(self.arrays.len())?;
        let arr = Array::new(shape)?;
        log::trace!("mem: array {id} over {shape:?}");
        self.arrays.push(arr);
        Ok(id)
    }

    /// Bind an allocated array to a typed slot.
    ///
    /// # Errors
    ///
    /// [`MemError::UnknownArray`] for an id not issued here,
    /// [`MemError::AlreadyBound`] if the slot is taken, and
    /// [`MemError::InvalidConfig`] for a slot index out of range.
    pub fn bind(&mut self, slot: Slot, id: ArrayId) -> Result<(), MemError> {
        self.array(id)?;
        let out_of_range = || MemError::InvalidConfig {
            reason: format!("slot {slot} out of range"),
        };
        let target = match slot {
            Slot::Psi { eqn, tlev } => self
                .psi
                .get_mut(eqn)
                .and_then(|levels| levels.get_mut(tlev))
                .ok_or_else(out_of_range)?,
            Slot::Courant { axis } => self.gc.get_mut(axis).ok_or_else(out_of_range)?,
            Slot::Metric => &mut self.g,
            Slot::Kahan { eqn, k } => self
                .khn
                .get_mut(eqn)
                .and_then(|bufs| bufs.get_mut(k))
                .ok_or_else(out_of_range)?,
        };
        if target.is_some() {
            return Err(MemError::AlreadyBound {
                what: slot.to_string(),
            });
        }
        *target = Some(id);
        Ok(())
    }

    /// Allocate over `shape` and bind to `slot` in one step.
    ///
    /// # Errors
    ///
    /// As [`allocate`](Mem::allocate) and [`bind`](Mem::bind).
    pub fn allocate_slot(&mut self, slot: Slot, shape: [Rng; D]) -> Result<ArrayId, MemError> {
        let id = self.allocate(shape)?;
        self.bind(slot, id)?;
        Ok(id)
    }

    pub(crate) fn register_tmp(&mut self, tag: &str, group: Vec<ArrayId>) {
        self.tmp.entry(tag.to_owned()).or_default().push(group);
    }

    // ── Typed access ────────────────────────────────────────────

    /// Array by registry id.
    ///
    /// # Errors
    ///
    /// [`MemError::UnknownArray`] if `id` was not issued by this manager.
    pub fn array(&self, id: ArrayId) -> Result<&Array<T, D>, MemError> {
        self.arrays
            .get(id.0 as usize)
            .ok_or(MemError::UnknownArray { id })
    }

    fn bound(&self, id: Option<ArrayId>, slot: Slot) -> Result<&Array<T, D>, MemError> {
        match id {
            Some(id) => self.array(id),
            None => Err(MemError::NotAllocated {
                what: slot.to_string(),
            }),
        }
    }

    /// Advectee `eqn` at time level `tlev`.
    ///
    /// # Errors
    ///
    /// [`MemError::NotAllocated`] if nothing is bound there.
    pub fn psi(&self, eqn: usize, tlev: usize) -> Result<&Array<T, D>, MemError> {
        let id = self
            .psi
            .get(eqn)
            .and_then(|levels| levels.get(tlev))
            .copied()
            .flatten();
        self.bound(id, Slot::Psi { eqn, tlev })
    }

    /// Every time level of equation `eqn`, indexed by level.
    ///
    /// # Errors
    ///
    /// [`MemError::NotAllocated`] if any level is missing.
    pub fn psi_set(&self, eqn: usize) -> Result<[&Array<T, D>; N_TLEV], MemError> {
        let mut out = Vec::with_capacity(N_TLEV);
        for tlev in 0..N_TLEV {
            out.push(self.psi(eqn, tlev)?);
        }
        out.try_into().map_err(|_| MemError::NotAllocated {
            what: format!("psi[{eqn}]"),
        })
    }

    /// Courant component normal to axis `d`.
    ///
    /// # Errors
    ///
    /// [`MemError::NotAllocated`] if nothing is bound there.
    pub fn gc(&self, d: usize) -> Result<&Array<T, D>, MemError> {
        self.bound(self.gc.get(d).copied().flatten(), Slot::Courant { axis: d })
    }

    /// All Courant components, indexed by axis.
    ///
    /// # Errors
    ///
    /// [`MemError::NotAllocated`] if any component is missing.
    pub fn gc_set(&self) -> Result<ArrVec<'_, T, D>, MemError> {
        let mut out = Vec::with_capacity(D);
        for d in 0..D {
            out.push(self.gc(d)?);
        }
        out.try_into().map_err(|_| MemError::NotAllocated {
            what: "gc".into(),
        })
    }

    /// The metric factor `G`.
    ///
    /// # Errors
    ///
    /// [`MemError::NotAllocated`] unless `NUG` storage was allocated.
    pub fn g(&self) -> Result<&Array<T, D>, MemError> {
        self.bound(self.g, Slot::Metric)
    }

    /// The metric factor if one was allocated.
    pub fn g_opt(&self) -> Option<&Array<T, D>> {
        self.g.and_then(|id| self.array(id).ok())
    }

    /// The Kahan buffers of equation `eqn`.
    ///
    /// The compensation they carry belongs to the cell values of that
    /// equation, whichever time level currently holds them.
    ///
    /// # Errors
    ///
    /// [`MemError::NotAllocated`] unless `KHN` storage was allocated.
    pub fn khn(&self, eqn: usize) -> Result<[&Array<T, D>; N_KHN], MemError> {
        let at = move |k: usize| {
            let id = self.khn.get(eqn).and_then(|bufs| bufs.get(k)).copied().flatten();
            self.bound(id, Slot::Kahan { eqn, k })
        };
        Ok([at(0)?, at(1)?, at(2)?])
    }

    /// Group `group` of the scratch arrays registered under `tag`.
    ///
    /// # Errors
    ///
    /// [`MemError::UnknownTag`] if the tag or group does not exist.
    pub fn tmp(&self, tag: &str, group: usize) -> Result<Vec<&Array<T, D>>, MemError> {
        let ids = self
            .tmp
            .get(tag)
            .and_then(|groups| groups.get(group))
            .ok_or_else(|| MemError::UnknownTag {
                tag: format!("{tag}#{group}"),
            })?;
        ids.iter().map(|&id| self.array(id)).collect()
    }

    /// Number of scratch groups registered under `tag`.
    pub fn tmp_groups(&self, tag: &str) -> usize {
        self.tmp.get(tag).map_or(0, Vec::len)
    }

    /// Scratch tags in registration order.
    pub fn tmp_tags(&self) -> impl Iterator<Item = &str> {
        self.tmp.keys().map(String::as_str)
    }

    // ── Rank synchronisation ────────────────────────────────────

    /// Block until every rank arrives.
    ///
    /// # Errors
    ///
    /// [`MemError::Aborted`] once another rank has poisoned the run.
    pub fn barrier(&self) -> Result<(), MemError> {
        self.sync.wait()
    }

    /// Mark the run as failed and release all ranks from barriers.
    pub fn poison(&self) {
        log::warn!("mem: run poisoned");
        self.sync.poison();
    }

    /// Returns `true` once any rank has poisoned the run.
    pub fn is_poisoned(&self) -> bool {
        self.sync.is_poisoned()
    }

    /// Collective maximum over ranks; see [`RankSync::reduce_max`].
    ///
    /// # Errors
    ///
    /// As [`RankSync::reduce_max`].
    pub fn reduce_max(&self, rank: usize, value: f64) -> Result<f64, MemError> {
        self.sync.reduce_max(rank, value)
    }
}

/// The id of the array recorded after `len` others.
fn next_id(len: usize) -> Result<ArrayId, MemError> {
    u32::try_from(len)
        .map(ArrayId)
        .map_err(|_| MemError::InvalidConfig {
            reason: format!("array registry full at {len} arrays"),
        })
}

impl<T: Real, const D: usize> fmt::Debug for Mem<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mem")
            .field("grid", &self.grid)
            .field("opts", &self.opts)
            .field("n_eqns", &self.n_eqns)
            .field("n_arrays", &self.arrays.len())
            .field("n_ranks", &self.sync.n_ranks())
            .finish()
    }
}
