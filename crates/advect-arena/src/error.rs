//! Memory-manager error types.

use std::error::Error;
use std::fmt;

use advect_core::ArrayId;
use advect_grid::GridError;

/// Errors raised by the memory manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemError {
    /// The element count of a requested shape overflows `usize`.
    ShapeOverflow {
        /// Axis at which the running product overflowed.
        axis: usize,
    },
    /// An [`ArrayId`] that was never issued by this memory manager.
    UnknownArray {
        /// The unrecognised id.
        id: ArrayId,
    },
    /// A typed slot was read before anything was bound to it.
    NotAllocated {
        /// Description of the slot, e.g. `psi[1][0]`.
        what: String,
    },
    /// A typed slot was bound twice.
    AlreadyBound {
        /// Description of the slot.
        what: String,
    },
    /// No scratch group was registered under this tag.
    UnknownTag {
        /// The requested tag.
        tag: String,
    },
    /// Another rank failed and poisoned the run.
    Aborted,
    /// The memory configuration was rejected.
    InvalidConfig {
        /// Human-readable description.
        reason: String,
    },
    /// The grid described by the configuration is invalid.
    Grid(GridError),
}

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeOverflow { axis } => {
                write!(f, "array shape overflows usize at axis {axis}")
            }
            Self::UnknownArray { id } => write!(f, "unknown array id {id}"),
            Self::NotAllocated { what } => write!(f, "{what} has not been allocated"),
            Self::AlreadyBound { what } => write!(f, "{what} is already bound"),
            Self::UnknownTag { tag } => write!(f, "no scratch group under tag '{tag}'"),
            Self::Aborted => write!(f, "run aborted by another rank"),
            Self::InvalidConfig { reason } => write!(f, "invalid memory config: {reason}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
        }
    }
}

impl Error for MemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for MemError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
