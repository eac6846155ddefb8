//! Test utilities and mock types for advect development.
//!
//! Provides a mock [`StateReader`], initial-field generators, and the
//! boundary-condition wrappers in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{call_log, calls, BcCall, CallLog, FailingBc, RecordingBc};

use advect_arena::{ArrVec, Array};
use advect_core::{Real, StateReader};
use advect_grid::{for_each_index, Rng};

/// Mock implementation of [`StateReader`].
///
/// Pre-populate equations with [`set_state`](MockStateReader::set_state)
/// before passing to code under test.
pub struct MockStateReader<T> {
    states: Vec<Vec<T>>,
    timestep: u64,
}

impl<T: Clone> MockStateReader<T> {
    pub fn new(n_eqns: usize) -> Self {
        Self {
            states: vec![Vec::new(); n_eqns],
            timestep: 0,
        }
    }

    /// Pre-populate equation `eqn`. Ignored for an unknown index.
    pub fn set_state(&mut self, eqn: usize, data: Vec<T>) {
        if let Some(s) = self.states.get_mut(eqn) {
            *s = data;
        }
    }

    pub fn set_timestep(&mut self, t: u64) {
        self.timestep = t;
    }
}

impl<T: Clone> StateReader<T> for MockStateReader<T> {
    fn n_eqns(&self) -> usize {
        self.states.len()
    }

    fn read_state(&self, eqn: usize) -> Option<Vec<T>> {
        self.states.get(eqn).cloned()
    }

    fn timestep(&self) -> u64 {
        self.timestep
    }
}

// ── Field generators ───────────────────────────────────────────────

/// A unit step: one at cell `at` of axis 0, zero elsewhere.
pub fn unit_step<const D: usize>(at: i32) -> impl Fn([i32; D]) -> f64 {
    move |idx| if idx[0] == at { 1.0 } else { 0.0 }
}

/// A Gaussian bump of the given width centred at `centre` (cell units).
pub fn gaussian<const D: usize>(centre: [f64; D], width: f64) -> impl Fn([i32; D]) -> f64 {
    move |idx| {
        let r2: f64 = idx
            .iter()
            .zip(centre)
            .map(|(&i, c)| (f64::from(i) - c).powi(2))
            .sum();
        (-r2 / (2.0 * width * width)).exp()
    }
}

/// A deterministic pseudo-random field in `[lo, hi)`, reproducible from
/// `seed`.
pub fn hashed<const D: usize>(seed: u64, lo: f64, hi: f64) -> impl Fn([i32; D]) -> f64 {
    move |idx| {
        let mut h = seed ^ 0x9e37_79b9_7f4a_7c15;
        for i in idx {
            h ^= u64::from(i as u32);
            h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
            h ^= h >> 31;
        }
        lo + (hi - lo) * ((h >> 11) as f64 / (1u64 << 53) as f64)
    }
}

/// Fill every face of each Courant component with a constant,
/// `courant[d]` for axis `d`. A uniform field is divergence-free.
pub fn fill_uniform_courant<T: Real, const D: usize>(gc: &ArrVec<'_, T, D>, courant: [f64; D]) {
    for (arr, c) in gc.iter().zip(courant) {
        arr.fill(T::of(c));
    }
}

/// Fill the interior `ranges` of one component with `f`.
pub fn fill_from<T: Real, const D: usize>(
    arr: &Array<T, D>,
    ranges: &[Rng; D],
    f: impl Fn([i32; D]) -> f64,
) {
    for_each_index(ranges, |idx| arr.set(idx, T::of(f(idx))));
}
