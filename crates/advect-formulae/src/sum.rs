//! Update sums: the pairwise default and Kahan compensation.

use advect_arena::Array;
use advect_core::Real;

/// Sum face fluxes pairwise, left to right over pairs.
///
/// Two, four and six terms give `f1+f2`, `(f1+f2)+(f3+f4)` and
/// `((f1+f2)+(f3+f4))+(f5+f6)`. Pairing the incoming and outgoing flux of
/// one axis first keeps nearly-cancelling terms together.
#[inline]
pub fn pairwise_sum<T: Real>(fluxes: &[T]) -> T {
    let mut pairs = fluxes.chunks(2).map(|p| match *p {
        [a, b] => a + b,
        [a] => a,
        _ => T::zero(),
    });
    match pairs.next() {
        Some(first) => pairs.fold(first, |acc, p| acc + p),
        None => T::zero(),
    }
}

/// Compensated (Kahan) accumulator.
///
/// Holds the running sum, the compensation carried into the next term,
/// and the last corrected term. [`resume`](Kahan::resume) picks up a
/// compensation saved by an earlier accumulation, which is how the
/// update carries it from one time step to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kahan<T> {
    sum: T,
    comp: T,
    term: T,
}

impl<T: Real> Kahan<T> {
    /// Start accumulating from `init`.
    pub fn new(init: T) -> Self {
        Self::resume(init, T::zero())
    }

    /// Continue from `sum` whose low-order error is `comp`.
    pub fn resume(sum: T, comp: T) -> Self {
        Self {
            sum,
            comp,
            term: T::zero(),
        }
    }

    /// Add one term.
    #[inline]
    pub fn add(&mut self, x: T) {
        let y = x - self.comp;
        let t = self.sum + y;
        self.comp = (t - self.sum) - y;
        self.term = y;
        self.sum = t;
    }

    /// The compensated sum so far.
    pub fn sum(&self) -> T {
        self.sum
    }

    /// The compensation to subtract from the next term.
    pub fn comp(&self) -> T {
        self.comp
    }

    /// `[sum, compensation, corrected term]`.
    pub fn parts(&self) -> [T; 3] {
        [self.sum, self.comp, self.term]
    }
}

/// Combine the face fluxes of one cell with its previous value.
///
/// Without Kahan buffers: `ψ_new = ψ_old + pairwise_sum(fluxes) / g`.
///
/// With them, the increment `pairwise_sum(fluxes) / g` is added to
/// `ψ_old` by a Kahan step that resumes from the compensation left in
/// `khn[2]` at `idx` by the previous update of this cell. Afterwards
/// `khn[0]` holds the increment, `khn[1]` the corrected increment and
/// `khn[2]` the new compensation. Only `psi_new` and the buffers are
/// written.
#[inline]
pub fn donorcell_sum<T: Real, const D: usize>(
    psi_new: &Array<T, D>,
    psi_old: &Array<T, D>,
    idx: [i32; D],
    fluxes: &[T],
    g: T,
    khn: Option<&[&Array<T, D>; 3]>,
) {
    let old = psi_old.get(idx);
    let inc = pairwise_sum(fluxes) / g;
    let new = match khn {
        None => old + inc,
        Some([inc_buf, term_buf, comp_buf]) => {
            let mut acc = Kahan::resume(old, comp_buf.get(idx));
            acc.add(inc);
            let [sum, comp, term] = acc.parts();
            inc_buf.set(idx, inc);
            term_buf.set(idx, term);
            comp_buf.set(idx, comp);
            sum
        }
    };
    psi_new.set(idx, new);
}
