//! Rank synchronisation: a poisonable barrier and max-reduction slots.
//!
//! A rank that fails calls [`RankSync::poison`] instead of arriving at
//! the next barrier. Every rank blocked in, or later entering,
//! [`RankSync::wait`] is released with [`MemError::Aborted`], so a
//! failure on one subdomain can never leave the others waiting forever.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};

use crate::error::MemError;

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

/// Barrier and reduction state shared by all ranks of one run.
#[derive(Debug)]
pub struct RankSync {
    n_ranks: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
    slots: Box<[AtomicU64]>,
}

impl RankSync {
    /// Create synchronisation state for `n_ranks` cooperating ranks.
    pub fn new(n_ranks: usize) -> Self {
        Self {
            n_ranks,
            state: Mutex::new(BarrierState::default()),
            cvar: Condvar::new(),
            slots: (0..n_ranks).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Number of ranks the barrier waits for.
    pub fn n_ranks(&self) -> usize {
        self.n_ranks
    }

    /// Block until all ranks have arrived.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::Aborted`] if the run is or becomes poisoned
    /// before this barrier completes.
    pub fn wait(&self) -> Result<(), MemError> {
        let mut st = self.state.lock().map_err(|_| MemError::Aborted)?;
        if st.poisoned {
            return Err(MemError::Aborted);
        }
        st.arrived += 1;
        if st.arrived == self.n_ranks {
            st.arrived = 0;
            st.generation = st.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(());
        }
        let gen = st.generation;
        while st.generation == gen && !st.poisoned {
            st = self.cvar.wait(st).map_err(|_| MemError::Aborted)?;
        }
        if st.generation != gen {
            Ok(())
        } else {
            Err(MemError::Aborted)
        }
    }

    /// Mark the run as failed and release every waiting rank.
    pub fn poison(&self) {
        // A poisoned mutex means a rank already panicked; flag it anyway.
        let mut st = match self.state.lock() {
            Ok(st) => st,
            Err(poisoned) => poisoned.into_inner(),
        };
        st.poisoned = true;
        self.cvar.notify_all();
    }

    /// Returns `true` once any rank has poisoned the run.
    pub fn is_poisoned(&self) -> bool {
        match self.state.lock() {
            Ok(st) => st.poisoned,
            Err(_) => true,
        }
    }

    /// Global maximum of one value contributed by every rank.
    ///
    /// Collective: every rank must call it with its own `rank` index.
    /// All ranks return the same value. NaN contributions propagate.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::Aborted`] if the run is poisoned meanwhile, or
    /// [`MemError::InvalidConfig`] for a rank index out of range.
    pub fn reduce_max(&self, rank: usize, value: f64) -> Result<f64, MemError> {
        let slot = self.slots.get(rank).ok_or_else(|| MemError::InvalidConfig {
            reason: format!("rank {rank} out of range for {} ranks", self.n_ranks),
        })?;
        slot.store(value.to_bits(), Ordering::Relaxed);
        self.wait()?;
        let mut max = f64::NEG_INFINITY;
        for s in self.slots.iter() {
            let v = f64::from_bits(s.load(Ordering::Relaxed));
            if v.is_nan() || max.is_nan() {
                max = f64::NAN;
            } else if v > max {
                max = v;
            }
        }
        // Nobody may overwrite a slot before all ranks have read it.
        self.wait()?;
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn single_rank_barrier_never_blocks() {
        let s = RankSync::new(1);
        for _ in 0..3 {
            s.wait().unwrap();
        }
        assert_eq!(s.reduce_max(0, 2.5).unwrap(), 2.5);
    }

    #[test]
    fn reduce_max_agrees_across_ranks() {
        let s = RankSync::new(4);
        let results: Vec<f64> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|r| {
                    let s = &s;
                    scope.spawn(move || s.reduce_max(r, r as f64 * 1.5).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|&m| m == 4.5));
    }

    #[test]
    fn nan_propagates_through_reduction() {
        let s = RankSync::new(1);
        assert!(s.reduce_max(0, f64::NAN).unwrap().is_nan());
    }

    #[test]
    fn poison_releases_waiters() {
        let s = RankSync::new(3);
        let outcomes: Vec<Result<(), MemError>> = thread::scope(|scope| {
            let waiters: Vec<_> = (0..2)
                .map(|_| {
                    let s = &s;
                    scope.spawn(move || s.wait())
                })
                .collect();
            // The third rank fails instead of arriving.
            s.poison();
            waiters.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(outcomes.iter().all(|o| *o == Err(MemError::Aborted)));
        assert!(s.is_poisoned());
        assert_eq!(s.wait(), Err(MemError::Aborted));
    }

    #[test]
    fn rank_out_of_range_is_rejected() {
        let s = RankSync::new(2);
        assert!(matches!(
            s.reduce_max(2, 0.0),
            Err(MemError::InvalidConfig { .. })
        ));
    }
}
