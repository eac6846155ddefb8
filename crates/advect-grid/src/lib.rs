//! Structured-grid indexing for the advect solver.
//!
//! This crate defines the index vocabulary every other crate speaks:
//! inclusive index ranges ([`Rng`]), the half-index staggering marker
//! ([`H`]), the axis permutation [`pi`] that lets one formula written
//! for axis 0 serve any axis, the [`Grid`] shape description, and the
//! slab [`decompose`] used by the concurrency layer.
//!
//! # Staggering
//!
//! Scalars live at cell centres `i`; Courant numbers live at faces
//! `i ± ½`. Face `i+½` is stored at integer index `i`, so
//!
//! ```
//! use advect_grid::H;
//!
//! let i = 4;
//! assert_eq!(i + H, 4); // face i+½
//! assert_eq!(i - H, 3); // face i-½
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod decompose;
pub mod error;
pub mod grid;
pub mod iter;
pub mod perm;
pub mod range;

pub use decompose::{decompose, Slabs};
pub use error::GridError;
pub use grid::Grid;
pub use iter::{for_each_index, BoxIter};
pub use perm::{pi, pi_inv};
pub use range::{rng_sclr, rng_vctr, Half, Rng, H};
