//! Memory manager for advect solvers.
//!
//! Every array a solver touches is owned here, so that array lifetime is
//! tied to the memory manager rather than to any one subdomain.
//!
//! # Architecture
//!
//! ```text
//! Mem (one per run, shared by all ranks via &Mem)
//! ├── registry: Vec<Array> indexed by ArrayId (append-only)
//! ├── psi[eqn][tlev], gc[axis], G?, khn[3]?   typed slots
//! ├── tmp: IndexMap<tag, groups>               solver-extension scratch
//! └── RankSync: poisonable barrier + reduction slots
//! ```
//!
//! # Sharing without `unsafe`
//!
//! [`Array`] keeps each element as the bit pattern of a [`Real`] inside an
//! `AtomicU64`. Subdomain threads write disjoint cells through a shared
//! reference with relaxed ordering; [`Mem::barrier`] supplies the
//! happens-before edges between phases.
//!
//! [`Real`]: advect_core::Real

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod config;
pub mod error;
pub mod mem;
pub mod scratch;
pub mod sync;

pub use array::{ArrVec, Array};
pub use config::MemConfig;
pub use error::MemError;
pub use mem::{Mem, Slot, N_KHN};
pub use scratch::{alloc_tmp_sclr, alloc_tmp_vctr};
pub use sync::RankSync;
