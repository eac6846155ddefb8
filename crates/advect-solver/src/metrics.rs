//! Per-rank performance counters for [`SolverCore::advance`](crate::SolverCore::advance).

/// Timing and counter metrics accumulated by one rank.
///
/// Durations are in microseconds and cumulative over every `advance`
/// call, except `last_step_us`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvanceMetrics {
    /// Completed time steps.
    pub steps: u64,
    /// Time spent in halo exchanges, barriers included.
    pub exchange_us: u64,
    /// Time spent in the donor-cell update.
    pub advop_us: u64,
    /// Time spent in the one-off ante-loop check.
    pub ante_loop_us: u64,
    /// Wall-clock time of the most recent step.
    pub last_step_us: u64,
    /// Barriers passed.
    pub barriers: u64,
    /// Boundary-handle calls made.
    pub bc_calls: u64,
}

impl AdvanceMetrics {
    /// Total time inside `advance`, ante loop included.
    pub fn total_us(&self) -> u64 {
        self.exchange_us + self.advop_us + self.ante_loop_us
    }

    /// Element-wise combination of two ranks' metrics: counters add,
    /// timings take the slower rank.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            steps: self.steps.max(other.steps),
            exchange_us: self.exchange_us.max(other.exchange_us),
            advop_us: self.advop_us.max(other.advop_us),
            ante_loop_us: self.ante_loop_us.max(other.ante_loop_us),
            last_step_us: self.last_step_us.max(other.last_step_us),
            barriers: self.barriers + other.barriers,
            bc_calls: self.bc_calls + other.bc_calls,
        }
    }
}
