//! Reusable boundary-condition test fixtures.
//!
//! Two wrappers around a real handle for protocol and failure testing:
//!
//! - [`RecordingBc`]: logs every call, then delegates.
//! - [`FailingBc`]: delegates N times, then fails deterministically.

use std::sync::{Arc, Mutex};

use advect_arena::{ArrVec, Array};
use advect_bcond::{BoundaryCondition, Side};
use advect_core::{BcError, Real};
use advect_grid::Rng;

/// One recorded boundary call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BcCall {
    pub axis: usize,
    pub side: Side,
    pub op: &'static str,
    /// Orthogonal box as passed, for corner-ordering checks.
    pub ortho: Vec<Rng>,
}

/// Shared call log, appended to by every recording handle of a rank.
pub type CallLog = Arc<Mutex<Vec<BcCall>>>;

/// Create an empty call log.
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot of a call log as `(axis, side, op)` triples.
pub fn calls(log: &CallLog) -> Vec<(usize, Side, &'static str)> {
    match log.lock() {
        Ok(v) => v.iter().map(|c| (c.axis, c.side, c.op)).collect(),
        Err(p) => p.into_inner().iter().map(|c| (c.axis, c.side, c.op)).collect(),
    }
}

/// Records every call into a shared [`CallLog`], then delegates.
///
/// Useful for checking the axis order of the exchange protocol and the
/// boxes handed to each side.
pub struct RecordingBc<T: Real, const D: usize> {
    inner: Box<dyn BoundaryCondition<T, D>>,
    log: CallLog,
}

impl<T: Real, const D: usize> RecordingBc<T, D> {
    pub fn new(inner: Box<dyn BoundaryCondition<T, D>>, log: CallLog) -> Self {
        Self { inner, log }
    }

    fn record(&self, op: &'static str, ortho: &[Rng; D]) {
        let call = BcCall {
            axis: self.inner.axis(),
            side: self.inner.side(),
            op,
            ortho: ortho.to_vec(),
        };
        if let Ok(mut v) = self.log.lock() {
            v.push(call);
        }
    }
}

impl<T: Real, const D: usize> BoundaryCondition<T, D> for RecordingBc<T, D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn axis(&self) -> usize {
        self.inner.axis()
    }

    fn side(&self) -> Side {
        self.inner.side()
    }

    fn fill_halos_sclr(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        deriv: bool,
    ) -> Result<(), BcError> {
        self.record("sclr", ortho);
        self.inner.fill_halos_sclr(arr, ortho, deriv)
    }

    fn fill_halos_vctr_alng(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        self.record("vctr_alng", ortho);
        self.inner.fill_halos_vctr_alng(arrvec, ortho)
    }

    fn fill_halos_vctr_nrml(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.record("vctr_nrml", ortho);
        self.inner.fill_halos_vctr_nrml(arr, ortho)
    }

    fn fill_halos_pres(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.record("pres", ortho);
        self.inner.fill_halos_pres(arr, ortho)
    }

    fn set_edge_pres(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        sign: i32,
    ) -> Result<(), BcError> {
        self.record("set_edge_pres", ortho);
        self.inner.set_edge_pres(arr, ortho, sign)
    }

    fn save_edge_vel(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.record("save_edge_vel", ortho);
        self.inner.save_edge_vel(arr, ortho)
    }
}

/// Delegates a configurable number of calls, then fails every call.
///
/// Useful for testing error propagation and that sibling ranks are
/// released from their barriers instead of deadlocking.
pub struct FailingBc<T: Real, const D: usize> {
    inner: Box<dyn BoundaryCondition<T, D>>,
    pub succeed_count: usize,
    call_count: usize,
}

impl<T: Real, const D: usize> FailingBc<T, D> {
    /// Create a handle that succeeds `succeed_count` times then fails.
    pub fn new(inner: Box<dyn BoundaryCondition<T, D>>, succeed_count: usize) -> Self {
        Self {
            inner,
            succeed_count,
            call_count: 0,
        }
    }

    /// How many calls have been made.
    pub fn calls(&self) -> usize {
        self.call_count
    }

    fn tick(&mut self) -> Result<(), BcError> {
        let n = self.call_count;
        self.call_count += 1;
        if n >= self.succeed_count {
            return Err(BcError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }
}

impl<T: Real, const D: usize> BoundaryCondition<T, D> for FailingBc<T, D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn axis(&self) -> usize {
        self.inner.axis()
    }

    fn side(&self) -> Side {
        self.inner.side()
    }

    fn fill_halos_sclr(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        deriv: bool,
    ) -> Result<(), BcError> {
        self.tick()?;
        self.inner.fill_halos_sclr(arr, ortho, deriv)
    }

    fn fill_halos_vctr_alng(
        &mut self,
        arrvec: &ArrVec<'_, T, D>,
        ortho: &[Rng; D],
    ) -> Result<(), BcError> {
        self.tick()?;
        self.inner.fill_halos_vctr_alng(arrvec, ortho)
    }

    fn fill_halos_vctr_nrml(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.tick()?;
        self.inner.fill_halos_vctr_nrml(arr, ortho)
    }

    fn fill_halos_pres(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.tick()?;
        self.inner.fill_halos_pres(arr, ortho)
    }

    fn set_edge_pres(
        &mut self,
        arr: &Array<T, D>,
        ortho: &[Rng; D],
        sign: i32,
    ) -> Result<(), BcError> {
        self.tick()?;
        self.inner.set_edge_pres(arr, ortho, sign)
    }

    fn save_edge_vel(&mut self, arr: &Array<T, D>, ortho: &[Rng; D]) -> Result<(), BcError> {
        self.tick()?;
        self.inner.save_edge_vel(arr, ortho)
    }
}
