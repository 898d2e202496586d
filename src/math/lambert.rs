//! Principal branch of the Lambert W function for real arguments.

use crate::precision::Real;

/// Halley iterations allowed before giving up on further refinement.
const MAX_ITERATIONS: usize = 24;

/// Evaluate `W0(z)`, the solution `w >= -1` of `w * exp(w) = z`.
///
/// Defined for `z >= -1/e`; smaller arguments return NaN. `W0(+inf)` is
/// `+inf`, which is what the exact diode formulations produce once their
/// exponential argument overflows.
pub fn lambert_w0<T: Real>(z: T) -> T {
    let zero = T::zero();
    let one = T::one();
    let two = one + one;

    if z.is_nan() {
        return z;
    }
    if z.is_infinite() {
        return if z > zero { z } else { T::nan() };
    }
    if z == zero {
        return zero;
    }

    let branch_point = -(-one).exp();
    if z < branch_point {
        return T::nan();
    }
    if z == branch_point {
        return -one;
    }

    let tolerance = T::epsilon() * T::from_wide(4.0);
    let mut w = initial_guess(z);

    for _ in 0..MAX_ITERATIONS {
        let ew = w.exp();
        let f = w * ew - z;
        let wp1 = w + one;
        let dw = f / (ew * wp1 - (w + two) * f / (two * wp1));
        if !dw.is_finite() {
            break;
        }
        w = w - dw;
        if dw.abs() <= tolerance * (one + w.abs()) {
            break;
        }
    }

    w
}

fn initial_guess<T: Real>(z: T) -> T {
    let one = T::one();

    if z < T::from_wide(-0.25) {
        // Series about the branch point -1/e
        let p = (T::from_wide(2.0) * (T::E() * z + one)).sqrt();
        -one + p - p * p / T::from_wide(3.0) + T::from_wide(11.0 / 72.0) * p * p * p
    } else if z < T::from_wide(3.0) {
        z.ln_1p()
    } else {
        let l1 = z.ln();
        let l2 = l1.ln();
        l1 - l2 + l2 / l1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_values() {
        assert_eq!(lambert_w0(0.0f64), 0.0);
        assert_relative_eq!(lambert_w0(1.0f64), 0.567_143_290_409_783_8, epsilon = 1e-15);
        assert_relative_eq!(lambert_w0(std::f64::consts::E), 1.0, epsilon = 1e-15);
        assert_relative_eq!(lambert_w0(-(-1.0f64).exp()), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverts_w_exp_w() {
        for &w in &[-0.9, -0.5, -1e-3, 1e-8, 0.3, 2.0, 10.0, 50.0, 300.0] {
            let z = w * f64::exp(w);
            assert_relative_eq!(lambert_w0(z), w, max_relative = 1e-12, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_single_precision() {
        for &w in &[-0.5f32, 0.1, 1.0, 7.5, 40.0] {
            let z = w * w.exp();
            assert_relative_eq!(lambert_w0(z), w, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_domain_edges() {
        assert!(lambert_w0(-1.0f64).is_nan());
        assert!(lambert_w0(f64::NAN).is_nan());
        assert_eq!(lambert_w0(f64::INFINITY), f64::INFINITY);
        assert!(lambert_w0(f64::NEG_INFINITY).is_nan());
    }
}
