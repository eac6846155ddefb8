//! Slab decomposition of one axis across cooperating ranks.

use smallvec::SmallVec;

use crate::error::GridError;
use crate::range::Rng;

/// Per-rank interior ranges along the decomposed axis.
pub type Slabs = SmallVec<[Rng; 8]>;

/// Split `n` cells into `ranks` contiguous, non-overlapping slabs.
///
/// Slabs tile `0..n` in rank order. When `n` is not divisible by
/// `ranks`, the first `n % ranks` ranks receive one extra cell.
///
/// # Errors
///
/// Returns [`GridError::TooManyRanks`] if `ranks` is zero or exceeds `n`,
/// since every rank must own at least one cell.
pub fn decompose(n: usize, ranks: usize) -> Result<Slabs, GridError> {
    if ranks == 0 || ranks > n {
        return Err(GridError::TooManyRanks { ranks, cells: n });
    }
    if n > i32::MAX as usize {
        return Err(GridError::DimensionTooLarge {
            axis: 0,
            value: n,
            max: i32::MAX as usize,
        });
    }
    let base = n / ranks;
    let rem = n % ranks;
    let mut slabs = Slabs::with_capacity(ranks);
    let mut first = 0usize;
    for r in 0..ranks {
        let len = base + usize::from(r < rem);
        slabs.push(Rng::new(first as i32, (first + len) as i32 - 1));
        first += len;
    }
    Ok(slabs)
}
