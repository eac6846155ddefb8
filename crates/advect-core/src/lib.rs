//! Core types and traits for the advect donor-cell solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: the
//! [`Real`] scalar trait, the closed numerical option set [`Opts`],
//! array and rank identifiers, the boundary-condition error type, and
//! the read-only output trait consumed by external collaborators.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod opts;
pub mod real;
pub mod traits;

pub use error::BcError;
pub use id::{ArrayId, Rank};
pub use opts::{Opt, Opts};
pub use real::Real;
pub use traits::StateReader;

/// Number of time levels kept per equation (double buffering).
pub const N_TLEV: usize = 2;

/// Halo width, in cells, around every subdomain.
pub const HALO: i32 = 1;
