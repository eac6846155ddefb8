//! Donor-cell flux and update formulae.
//!
//! Everything here is a pure function of ψ at time level `n`, the
//! Courant field and the optional metric: the kernels write ψ at level
//! `n+1` over the index ranges they are given and nothing else. Halos
//! must already be filled.
//!
//! The flux functions take a *canonical* index tuple whose leading entry
//! runs along the advected axis `d`; [`pi`](advect_grid::pi) maps it
//! onto the array. One pair of functions thereby serves every axis.
//!
//! ```
//! use advect_formulae::f;
//!
//! // Flow to the right takes the left (upwind) value.
//! assert_eq!(f(2.0_f64, 5.0, 0.5), 1.0);
//! // Flow to the left takes the right value.
//! assert_eq!(f(2.0_f64, 5.0, -0.5), -2.5);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod diag;
pub mod flux;
pub mod op;
pub mod sum;

pub use diag::{div_tolerance, max_abs_div};
pub use flux::{f, flux_left, flux_rght, negpart, pospart};
pub use op::{op, op_1d, op_1d_iga, op_2d, op_2d_iga, op_3d, op_3d_iga, op_iga, Fields};
pub use sum::{donorcell_sum, pairwise_sum, Kahan};
