//! Error types for grid construction and decomposition.

use std::fmt;

/// Errors arising from grid construction or slab decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Only 1, 2, and 3 spatial dimensions are supported.
    UnsupportedDimensionality {
        /// The requested number of dimensions.
        ndim: usize,
    },
    /// An axis was given zero cells.
    EmptyAxis {
        /// The offending axis.
        axis: usize,
    },
    /// An extent does not fit the `i32` index space with its halo.
    DimensionTooLarge {
        /// The offending axis.
        axis: usize,
        /// The provided extent.
        value: usize,
        /// The maximum allowed extent.
        max: usize,
    },
    /// A slab decomposition was asked for more ranks than cells, or zero ranks.
    TooManyRanks {
        /// Requested rank count.
        ranks: usize,
        /// Cells available along the decomposition axis.
        cells: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDimensionality { ndim } => {
                write!(f, "{ndim}-dimensional grids are not supported (1, 2 or 3)")
            }
            Self::EmptyAxis { axis } => write!(f, "axis {axis} must have at least one cell"),
            Self::DimensionTooLarge { axis, value, max } => {
                write!(f, "axis {axis} extent {value} exceeds maximum {max}")
            }
            Self::TooManyRanks { ranks, cells } => {
                write!(f, "cannot split {cells} cells across {ranks} ranks")
            }
        }
    }
}

impl std::error::Error for GridError {}
