//! Solver error taxonomy.

use std::error::Error;
use std::fmt;

use advect_arena::MemError;
use advect_core::BcError;

use crate::config::ConfigError;

/// Errors raised while allocating, checking, or advancing a solver.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// The configuration was rejected before anything was allocated.
    Config(ConfigError),
    /// The initial Courant field has a discrete divergence above tolerance.
    DivergentCourant {
        /// Largest `|Σ_d C_d(i-½) - C_d(i+½)|` over the domain.
        max_abs_div: f64,
        /// The tolerance it was compared against.
        tolerance: f64,
    },
    /// The metric factor is not strictly positive somewhere.
    NonPositiveMetric {
        /// Smallest metric value over the domain.
        min: f64,
    },
    /// A boundary-condition handle failed.
    Boundary {
        /// Name of the failing handle.
        name: String,
        /// The handle's own error.
        reason: BcError,
    },
    /// The memory manager failed.
    Mem(MemError),
    /// Another rank failed; this rank stopped at the next barrier.
    Aborted,
    /// A rank thread panicked.
    RankPanicked {
        /// Index of the rank.
        rank: usize,
    },
    /// A rank thread could not be spawned.
    ThreadSpawnFailed {
        /// OS-level description.
        reason: String,
    },
    /// An equation index outside `0..n_eqns`.
    UnknownEquation {
        /// The requested index.
        eqn: usize,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::DivergentCourant {
                max_abs_div,
                tolerance,
            } => write!(
                f,
                "initial advector field is divergent: max |div| {max_abs_div:e} > {tolerance:e}"
            ),
            Self::NonPositiveMetric { min } => {
                write!(f, "metric factor must be strictly positive, minimum is {min}")
            }
            Self::Boundary { name, reason } => write!(f, "boundary '{name}': {reason}"),
            Self::Mem(e) => write!(f, "memory: {e}"),
            Self::Aborted => write!(f, "aborted after a failure on another rank"),
            Self::RankPanicked { rank } => write!(f, "rank {rank} panicked"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::UnknownEquation { eqn } => write!(f, "no equation with index {eqn}"),
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Boundary { reason, .. } => Some(reason),
            Self::Mem(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemError> for SolverError {
    fn from(e: MemError) -> Self {
        match e {
            MemError::Aborted => Self::Aborted,
            other => Self::Mem(other),
        }
    }
}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_mem_error_maps_to_aborted() {
        assert_eq!(SolverError::from(MemError::Aborted), SolverError::Aborted);
        assert!(matches!(
            SolverError::from(MemError::UnknownTag { tag: "x".into() }),
            SolverError::Mem(_)
        ));
    }

    #[test]
    fn boundary_error_chains_reason() {
        let e = SolverError::Boundary {
            name: "open[0:left]".into(),
            reason: BcError::ExecutionFailed {
                reason: "edge cell missing".into(),
            },
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("open[0:left]"));
    }

    #[test]
    fn divergence_message_has_both_numbers() {
        let e = SolverError::DivergentCourant {
            max_abs_div: 0.5,
            tolerance: 1e-14,
        };
        let s = e.to_string();
        assert!(s.contains("5e-1"));
        assert!(s.contains("1e-14"));
    }
}
