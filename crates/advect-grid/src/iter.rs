//! Row-major traversal of `D`-dimensional index boxes.

use crate::range::Rng;

/// Visit every index of `bx` in row-major order (last axis fastest).
///
/// Does nothing if any axis of the box is empty.
#[inline]
pub fn for_each_index<const D: usize>(bx: &[Rng; D], mut f: impl FnMut([i32; D])) {
    for it in BoxIter::new(bx) {
        f(it);
    }
}

/// Iterator over the indices of a box, row-major.
#[derive(Clone, Debug)]
pub struct BoxIter<const D: usize> {
    bx: [Rng; D],
    next: Option<[i32; D]>,
}

impl<const D: usize> BoxIter<D> {
    /// Start iterating over `bx`.
    pub fn new(bx: &[Rng; D]) -> Self {
        let next = if D == 0 || bx.iter().any(|r| r.is_empty()) {
            None
        } else {
            Some(bx.map(Rng::first))
        };
        Self { bx: *bx, next }
    }
}

impl<const D: usize> Iterator for BoxIter<D> {
    type Item = [i32; D];

    fn next(&mut self) -> Option<[i32; D]> {
        let cur = self.next?;
        // Odometer increment, carrying from the last axis.
        let mut nxt = cur;
        let mut axis = D;
        loop {
            if axis == 0 {
                self.next = None;
                break;
            }
            axis -= 1;
            if nxt[axis] < self.bx[axis].last() {
                nxt[axis] += 1;
                self.next = Some(nxt);
                break;
            }
            nxt[axis] = self.bx[axis].first();
        }
        Some(cur)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            Some(_) => {
                let total: usize = self.bx.iter().map(|r| r.len()).product();
                (0, Some(total))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_order_2d() {
        let mut seen = Vec::new();
        for_each_index(&[Rng::new(0, 1), Rng::new(-1, 0)], |ij| seen.push(ij));
        assert_eq!(seen, vec![[0, -1], [0, 0], [1, -1], [1, 0]]);
    }

    #[test]
    fn visits_every_cell_once_3d() {
        let bx = [Rng::new(0, 2), Rng::new(0, 3), Rng::new(-1, 1)];
        let all: Vec<_> = BoxIter::new(&bx).collect();
        assert_eq!(all.len(), 3 * 4 * 3);
        let mut sorted = all.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
    }

    #[test]
    fn empty_axis_yields_nothing() {
        let bx = [Rng::new(0, 3), Rng::new(2, 1)];
        assert_eq!(BoxIter::new(&bx).count(), 0);
    }
}
