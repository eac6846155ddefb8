//! Criterion micro-benchmarks for the flux and donor-cell update kernels.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use advect_arena::{Mem, MemConfig};
use advect_core::Opts;
use advect_formulae::{f, op_2d, op_3d, pairwise_sum, Fields, Kahan};
use advect_grid::Rng;
use advect_solver::alloc;
use advect_test_utils::{fill_from, fill_uniform_courant, hashed};

/// Build a memory manager with every array allocated and filled.
fn make_mem<const D: usize>(extents: [usize; D], opts: Opts) -> Mem<f64, D> {
    let mut cfg = MemConfig::new(extents, 1);
    cfg.opts = opts;
    let mut mem = Mem::new(&cfg).unwrap();
    alloc(&mut mem).unwrap();
    let grid = *mem.grid();
    fill_from(mem.psi(0, 0).unwrap(), &grid.sclr_shape(), hashed(1, 0.0, 1.0));
    fill_uniform_courant(&mem.gc_set().unwrap(), [0.2; D]);
    mem
}

fn fields<const D: usize>(mem: &Mem<f64, D>) -> Fields<'_, f64, D> {
    Fields {
        psi: mem.psi_set(0).unwrap(),
        n: 0,
        gc: mem.gc_set().unwrap(),
        g: mem.g_opt(),
        khn: mem.khn(0).ok(),
    }
}

fn bench_flux(c: &mut Criterion) {
    let psi: Vec<f64> = (0..1024).map(|i| f64::from(i % 7)).collect();
    c.bench_function("flux_f_1k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for w in psi.windows(2) {
                acc += f(w[0], w[1], black_box(0.3));
            }
            black_box(acc)
        });
    });
}

fn bench_sums(c: &mut Criterion) {
    let terms = [0.1, -0.2, 0.3, -0.05, 0.07, -0.11];
    c.bench_function("pairwise_sum_6", |b| {
        b.iter(|| black_box(pairwise_sum(black_box(&terms))));
    });
    c.bench_function("kahan_sum_6", |b| {
        b.iter(|| {
            let mut k = Kahan::new(black_box(1.0));
            for t in terms {
                k.add(t);
            }
            black_box(k.sum())
        });
    });
}

fn bench_op_2d(c: &mut Criterion) {
    let mem = make_mem([128, 128], Opts::empty());
    let fl = fields(&mem);
    let (i, j) = (Rng::interior(128), Rng::interior(128));
    c.bench_function("op_2d_16k", |b| {
        b.iter(|| op_2d(Opts::empty(), black_box(&fl), i, j));
    });

    let mem = make_mem([128, 128], Opts::KHN);
    let fl = fields(&mem);
    c.bench_function("op_2d_16k_kahan", |b| {
        b.iter(|| op_2d(Opts::KHN, black_box(&fl), i, j));
    });
}

fn bench_op_3d(c: &mut Criterion) {
    let mem = make_mem([32, 32, 32], Opts::NUG);
    let fl = fields(&mem);
    let r = Rng::interior(32);
    c.bench_function("op_3d_32k_metric", |b| {
        b.iter(|| op_3d(Opts::NUG, black_box(&fl), r, r, r));
    });
}

criterion_group!(benches, bench_flux, bench_sums, bench_op_2d, bench_op_3d);
criterion_main!(benches);
