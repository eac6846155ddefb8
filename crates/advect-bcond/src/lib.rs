//! Boundary conditions for advect solvers.
//!
//! The solver core never fills a halo itself: it hands each array to
//! the [`BoundaryCondition`] of every `(axis, side)` in a fixed order and
//! synchronises around the calls. This crate defines that capability and
//! three implementations:
//!
//! - [`Cyclic`]: periodic wrap-around.
//! - [`Open`]: zero-gradient outflow.
//! - [`Shared`]: the seam between two threads' slabs, where the
//!   neighbour's interior already sits in the halo and nothing is done.
//!
//! # Boxes
//!
//! Every method receives an orthogonal index box `&[Rng; D]`. Its entry
//! for the handle's own axis is ignored and replaced by the ghost range;
//! the remaining entries bound what is read and written.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bcond;
pub mod cyclic;
pub mod open;
pub mod shared;

pub use bcond::{BoundaryCondition, Side};
pub use cyclic::Cyclic;
pub use open::Open;
pub use shared::Shared;
