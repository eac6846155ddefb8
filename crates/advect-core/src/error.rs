//! Error type shared by boundary-condition collaborators.
//!
//! The solver core never interprets these errors; it wraps them with the
//! failing handle's name and passes them through unchanged.

use std::error::Error;
use std::fmt;

/// Errors raised by a boundary-condition implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BcError {
    /// The fill could not be carried out.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The array handed to the handle does not cover the cells it must
    /// read or write.
    ShapeMismatch {
        /// Axis along which the mismatch was detected.
        axis: usize,
        /// Description of the expected coverage.
        expected: String,
    },
}

impl fmt::Display for BcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::ShapeMismatch { axis, expected } => {
                write!(f, "array shape mismatch along axis {axis}: expected {expected}")
            }
        }
    }
}

impl Error for BcError {}
