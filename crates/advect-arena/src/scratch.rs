//! Named scratch groups for solver extensions.
//!
//! A solver built on the donor-cell core (an antidiffusive corrector,
//! say) needs temporaries of its own. It registers them under a tag of
//! its choosing; each call appends one group under that tag, so a tag
//! may hold several groups, retrieved by [`Mem::tmp`].

use advect_core::Real;

use crate::error::MemError;
use crate::mem::Mem;

/// Append a group of `n_arr` cell-centred arrays under `tag`.
///
/// Returns the index of the new group within the tag.
///
/// # Errors
///
/// Propagates allocation failures.
pub fn alloc_tmp_sclr<T: Real, const D: usize>(
    mem: &mut Mem<T, D>,
    tag: &str,
    n_arr: usize,
) -> Result<usize, MemError> {
    let shape = mem.grid().sclr_shape();
    let ids = (0..n_arr)
        .map(|_| mem.allocate(shape))
        .collect::<Result<Vec<_>, _>>()?;
    mem.register_tmp(tag, ids);
    log::debug!("mem: scratch '{tag}' += {n_arr} scalar array(s)");
    Ok(mem.tmp_groups(tag) - 1)
}

/// Append a group of `D` face-centred arrays under `tag`, component `d`
/// staggered along axis `d`.
///
/// Returns the index of the new group within the tag.
///
/// # Errors
///
/// Propagates allocation failures.
pub fn alloc_tmp_vctr<T: Real, const D: usize>(
    mem: &mut Mem<T, D>,
    tag: &str,
) -> Result<usize, MemError> {
    let grid = *mem.grid();
    let ids = (0..D)
        .map(|d| mem.allocate(grid.vctr_shape(d)))
        .collect::<Result<Vec<_>, _>>()?;
    mem.register_tmp(tag, ids);
    log::debug!("mem: scratch '{tag}' += vector group");
    Ok(mem.tmp_groups(tag) - 1)
}
