//! Diagnostics on the Courant field.

use advect_arena::ArrVec;
use advect_core::Real;
use advect_grid::{for_each_index, Rng, H};

/// Largest discrete Courant divergence accepted before the first step:
/// the machine epsilon of `T`.
pub fn div_tolerance<T: Real>() -> T {
    T::epsilon()
}

/// Maximum over `ranges` of `|Σ_d C_d(i-½) - C_d(i+½)|`.
///
/// Returns zero for an empty box. A NaN anywhere in the field yields NaN.
pub fn max_abs_div<T: Real, const D: usize>(gc: &ArrVec<'_, T, D>, ranges: &[Rng; D]) -> T {
    let mut max = T::zero();
    for_each_index(ranges, |idx| {
        let mut div = T::zero();
        for (d, c) in gc.iter().enumerate() {
            let mut left = idx;
            left[d] = idx[d] - H;
            div = div + (c.get(left) - c.get(idx));
        }
        let a = div.abs();
        if a.is_nan() || max.is_nan() {
            max = T::nan();
        } else if a > max {
            max = a;
        }
    });
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_arena::Array;
    use advect_grid::{rng_sclr, rng_vctr};

    #[test]
    fn uniform_field_is_divergence_free() {
        let gc = Array::<f64, 1>::new([rng_vctr(8, 1)]).unwrap();
        gc.fill(0.7);
        assert_eq!(max_abs_div(&[&gc], &[Rng::interior(8)]), 0.0);
    }

    #[test]
    fn converging_flow_is_detected() {
        let gc = Array::<f64, 1>::new([rng_vctr(4, 1)]).unwrap();
        gc.fill_with(gc.shape(), |[i]| if i < 2 { 0.5 } else { -0.5 });
        // Cell 2 has inflow ½ on both faces.
        assert_eq!(max_abs_div(&[&gc], &[Rng::interior(4)]), 1.0);
    }

    #[test]
    fn rotational_2d_flow_cancels() {
        // C0 depends on j only and C1 on i only: each term vanishes.
        let gc0 = Array::<f64, 2>::new([rng_vctr(4, 1), rng_sclr(4, 1)]).unwrap();
        let gc1 = Array::<f64, 2>::new([rng_sclr(4, 1), rng_vctr(4, 1)]).unwrap();
        gc0.fill_with(gc0.shape(), |[_, j]| 0.1 * f64::from(j));
        gc1.fill_with(gc1.shape(), |[i, _]| -0.1 * f64::from(i));
        let r = [Rng::interior(4), Rng::interior(4)];
        assert_eq!(max_abs_div(&[&gc0, &gc1], &r), 0.0);
    }

    #[test]
    fn tolerance_is_one_epsilon() {
        assert_eq!(div_tolerance::<f64>(), f64::EPSILON);
        assert_eq!(div_tolerance::<f32>(), f32::EPSILON);
    }

    #[test]
    fn single_raised_face_diverges_by_its_excess() {
        let gc = Array::<f64, 1>::new([rng_vctr(8, 1)]).unwrap();
        gc.fill(0.5);
        gc.set([3], 0.5 + 10.0 * f64::EPSILON);
        let div = max_abs_div(&[&gc], &[Rng::interior(8)]);
        assert_eq!(div, 10.0 * f64::EPSILON);
        assert!(div > div_tolerance::<f64>());
    }

    #[test]
    fn nan_propagates() {
        let gc = Array::<f32, 1>::new([rng_vctr(3, 1)]).unwrap();
        gc.set([1], f32::NAN);
        assert!(max_abs_div(&[&gc], &[Rng::interior(3)]).is_nan());
    }
}
