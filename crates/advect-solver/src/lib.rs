//! Halo-exchange donor-cell solver for advect.
//!
//! This crate drives the formulae of `advect-formulae` over a grid held
//! in an `advect-arena` memory manager:
//!
//! - [`SolverConfig`]: what to solve, checked by
//!   [`validate()`](SolverConfig::validate) before anything is allocated.
//! - [`alloc`]: allocates ψ, the Courant field and optional arrays.
//! - [`SolverCore`]: one rank's exchange protocol, ante-loop checks and
//!   time stepping.
//! - [`Threads`]: the slab decomposition, running one core per thread.
//!
//! # Quick start
//!
//! ```
//! use advect_solver::{SolverConfig, Threads};
//!
//! let mut solver = Threads::<f64, 2>::new(SolverConfig::new([8, 8])).unwrap();
//! solver.courant(0).unwrap().fill(0.25);
//! solver.advectee(0).unwrap().fill(1.0);
//! solver.advance(4).unwrap();
//! assert_eq!(solver.timestep(), 4);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod concurr;
pub mod config;
pub mod core;
pub mod error;
pub mod metrics;

pub use concurr::{BcFactory, Threads};
pub use config::{BcKind, ConfigError, FluxForm, SolverConfig};
pub use core::{alloc, BcPair, ExchangePhase, RankState, SolverCore};
pub use error::SolverError;
pub use metrics::AdvanceMetrics;
