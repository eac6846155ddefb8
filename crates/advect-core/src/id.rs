//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an array owned by the memory manager.
///
/// Arrays are registered at allocation time and assigned sequential IDs.
/// `ArrayId(n)` is the n-th array recorded; IDs are never reused within
/// one memory manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(pub u32);

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ArrayId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a cooperating subdomain thread.
///
/// Rank 0 owns the lowest slab along the decomposition axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u32);

impl Rank {
    /// The rank as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Rank {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
