//! Dimension-generic donor-cell update and its per-dimension entry points.

use advect_arena::{ArrVec, Array};
use advect_core::{Opt, Opts, Real, N_TLEV};
use advect_grid::{for_each_index, pi_inv, Rng, H};
use smallvec::SmallVec;

use crate::flux::{flux_left, flux_rght};
use crate::sum::donorcell_sum;

/// The arrays one update step reads and writes.
#[derive(Clone, Copy, Debug)]
pub struct Fields<'a, T: Real, const D: usize> {
    /// ψ at every time level of one equation.
    pub psi: [&'a Array<T, D>; N_TLEV],
    /// Index of the current time level; `(n + 1) % N_TLEV` is written.
    pub n: usize,
    /// Courant components, one per axis.
    pub gc: ArrVec<'a, T, D>,
    /// Metric factor, used only with [`Opts::NUG`].
    pub g: Option<&'a Array<T, D>>,
    /// Kahan buffers, used only with [`Opts::KHN`].
    pub khn: Option<[&'a Array<T, D>; 3]>,
}

impl<'a, T: Real, const D: usize> Fields<'a, T, D> {
    fn source(&self) -> &'a Array<T, D> {
        self.psi[self.n % N_TLEV]
    }

    fn dest(&self) -> &'a Array<T, D> {
        self.psi[(self.n + 1) % N_TLEV]
    }

    /// The metric at `idx`, or one when the metric is off.
    #[inline]
    fn g_at(&self, opts: Opts, idx: [i32; D]) -> T {
        match self.g {
            Some(g) if opts.isset(Opt::Nug) => g.get(idx),
            _ => T::one(),
        }
    }

    fn khn_for(&self, opts: Opts) -> Option<&[&'a Array<T, D>; 3]> {
        if opts.isset(Opt::Khn) {
            self.khn.as_ref()
        } else {
            None
        }
    }
}

type Fluxes<T> = SmallVec<[T; 6]>;

/// Donor-cell update over `ranges` for any dimensionality.
///
/// For each cell and each axis `d`, the left and right face fluxes are
/// taken in that order, so the sum sees
/// `left₀, right₀, left₁, right₁, …`.
pub fn op<T: Real, const D: usize>(opts: Opts, fields: &Fields<'_, T, D>, ranges: &[Rng; D]) {
    let (src, dst) = (fields.source(), fields.dest());
    let khn = fields.khn_for(opts);
    for_each_index(ranges, |idx| {
        let mut fl = Fluxes::new();
        for (d, &gc) in fields.gc.iter().enumerate() {
            let canon = pi_inv(d, idx);
            fl.push(flux_left(src, gc, d, canon));
            fl.push(flux_rght(src, gc, d, canon));
        }
        donorcell_sum(dst, src, idx, &fl, fields.g_at(opts, idx), khn);
    });
}

/// Infinite-gauge update over `ranges`.
///
/// The fluxes are the signed face Courant numbers `-C(i+½)` and
/// `C(i-½)` per axis; ψ enters only as the previous value. This equals
/// [`op`] when ψ is uniform, and is the caller's choice to make.
pub fn op_iga<T: Real, const D: usize>(
    opts: Opts,
    fields: &Fields<'_, T, D>,
    ranges: &[Rng; D],
) {
    let (src, dst) = (fields.source(), fields.dest());
    let khn = fields.khn_for(opts);
    for_each_index(ranges, |idx| {
        let mut fl = Fluxes::new();
        for (d, &gc) in fields.gc.iter().enumerate() {
            let mut left = idx;
            left[d] = idx[d] - H;
            fl.push(-gc.get(idx));
            fl.push(gc.get(left));
        }
        donorcell_sum(dst, src, idx, &fl, fields.g_at(opts, idx), khn);
    });
}

/// 1-D donor-cell update.
pub fn op_1d<T: Real>(opts: Opts, fields: &Fields<'_, T, 1>, i: Rng) {
    op(opts, fields, &[i]);
}

/// 1-D infinite-gauge update.
pub fn op_1d_iga<T: Real>(opts: Opts, fields: &Fields<'_, T, 1>, i: Rng) {
    op_iga(opts, fields, &[i]);
}

/// 2-D donor-cell update.
pub fn op_2d<T: Real>(opts: Opts, fields: &Fields<'_, T, 2>, i: Rng, j: Rng) {
    op(opts, fields, &[i, j]);
}

/// 2-D infinite-gauge update.
pub fn op_2d_iga<T: Real>(opts: Opts, fields: &Fields<'_, T, 2>, i: Rng, j: Rng) {
    op_iga(opts, fields, &[i, j]);
}

/// 3-D donor-cell update.
pub fn op_3d<T: Real>(opts: Opts, fields: &Fields<'_, T, 3>, i: Rng, j: Rng, k: Rng) {
    op(opts, fields, &[i, j, k]);
}

/// 3-D infinite-gauge update.
pub fn op_3d_iga<T: Real>(opts: Opts, fields: &Fields<'_, T, 3>, i: Rng, j: Rng, k: Rng) {
    op_iga(opts, fields, &[i, j, k]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_grid::{rng_sclr, rng_vctr};

    struct Periodic1d {
        psi: [Array<f64, 1>; 2],
        gc: Array<f64, 1>,
        g: Array<f64, 1>,
        khn: [Array<f64, 1>; 3],
        n: i32,
    }

    impl Periodic1d {
        fn new(n: i32, init: impl Fn(i32) -> f64, c: f64) -> Self {
            let s = [rng_sclr(n, 1)];
            let mk = || Array::new(s).unwrap();
            let this = Self {
                psi: [mk(), mk()],
                gc: Array::new([rng_vctr(n, 1)]).unwrap(),
                g: mk(),
                khn: [mk(), mk(), mk()],
                n,
            };
            this.psi[0].fill_with(&[Rng::interior(n)], |[i]| init(i));
            this.psi[0].set([-1], this.psi[0].get([n - 1]));
            this.psi[0].set([n], this.psi[0].get([0]));
            this.gc.fill(c);
            this.g.fill(1.0);
            this
        }

        fn fields(&self, with_g: bool) -> Fields<'_, f64, 1> {
            Fields {
                psi: [&self.psi[0], &self.psi[1]],
                n: 0,
                gc: [&self.gc],
                g: with_g.then_some(&self.g),
                khn: Some([&self.khn[0], &self.khn[1], &self.khn[2]]),
            }
        }
    }

    #[test]
    fn unit_courant_shifts_by_one_cell() {
        let p = Periodic1d::new(5, |i| f64::from(i * i), 1.0);
        op_1d(Opts::empty(), &p.fields(false), Rng::interior(p.n));
        let got = p.psi[1].to_vec(&[Rng::interior(5)]);
        assert_eq!(got, vec![16.0, 0.0, 1.0, 4.0, 9.0]);
    }

    #[test]
    fn source_level_untouched() {
        let p = Periodic1d::new(4, |i| f64::from(i), 0.5);
        let before = p.psi[0].to_vec(p.psi[0].shape());
        op_1d(Opts::KHN, &p.fields(false), Rng::interior(p.n));
        assert_eq!(p.psi[0].to_vec(p.psi[0].shape()), before);
    }

    #[test]
    fn metric_divides_flux_sum_only_with_nug() {
        let p = Periodic1d::new(4, |i| f64::from(i), 0.5);
        p.g.fill(2.0);
        op_1d(Opts::empty(), &p.fields(true), Rng::point(1));
        let plain = p.psi[1].get([1]);
        op_1d(Opts::NUG, &p.fields(true), Rng::point(1));
        let scaled = p.psi[1].get([1]);
        // ψ(0)=0, ψ(1)=1, C=½: flux sum is -½.
        assert_eq!(plain, 0.5);
        assert_eq!(scaled, 0.75);
    }

    #[test]
    fn iga_matches_general_on_unit_field() {
        let p = Periodic1d::new(6, |_| 1.0, 0.3);
        p.gc.fill_with(p.gc.shape(), |[i]| 0.1 * f64::from(i.rem_euclid(3)));
        op_1d(Opts::empty(), &p.fields(false), Rng::interior(6));
        let general = p.psi[1].to_vec(&[Rng::interior(6)]);
        op_1d_iga(Opts::IGA, &p.fields(false), Rng::interior(6));
        let iga = p.psi[1].to_vec(&[Rng::interior(6)]);
        assert_eq!(general, iga);
    }

    #[test]
    fn two_d_update_uses_both_axes() {
        let s = [rng_sclr(3, 1), rng_sclr(3, 1)];
        let psi0 = Array::<f64, 2>::new(s).unwrap();
        let psi1 = Array::<f64, 2>::new(s).unwrap();
        psi0.fill(1.0);
        psi0.set([1, 1], 3.0);
        let gc0 = Array::<f64, 2>::new([rng_vctr(3, 1), rng_sclr(3, 1)]).unwrap();
        let gc1 = Array::<f64, 2>::new([rng_sclr(3, 1), rng_vctr(3, 1)]).unwrap();
        gc0.fill(0.25);
        gc1.fill(0.5);
        let fields = Fields {
            psi: [&psi0, &psi1],
            n: 0,
            gc: [&gc0, &gc1],
            g: None,
            khn: None,
        };
        op_2d(Opts::empty(), &fields, Rng::interior(3), Rng::interior(3));
        // Cell (1,1) loses ¼·3 along axis 0 and ½·3 along axis 1, gains
        // ¼ and ½ from its upwind neighbours.
        assert_eq!(psi1.get([1, 1]), 3.0 - 0.75 + 0.25 - 1.5 + 0.5);
        // Cell (2,1) is downwind along axis 0.
        assert_eq!(psi1.get([2, 1]), 1.0 + 0.75 - 0.25);
    }

    #[test]
    fn time_level_rotation_selects_source() {
        let p = Periodic1d::new(3, |_| 0.0, 0.0);
        p.psi[1].fill(4.0);
        let mut fields = p.fields(false);
        fields.n = 1;
        op_1d(Opts::empty(), &fields, Rng::interior(3));
        assert_eq!(p.psi[0].to_vec(&[Rng::interior(3)]), vec![4.0; 3]);
    }
}
