//! Wright omega function and its fast three-band approximation.
//!
//! `omega(x)` solves `w + ln(w) = x`, equivalently `omega(x) = W0(exp(x))`.
//! Evaluating it directly avoids forming `exp(x)` and so stays finite for
//! arguments where the Lambert W route overflows.

use super::poly::polyval;
use crate::precision::Real;

/// Lower edge of the cubic band of [`omega_approx`].
pub const OMEGA_APPROX_LOW: f64 = -3.341459552768620;

/// Upper edge of the cubic band of [`omega_approx`].
pub const OMEGA_APPROX_HIGH: f64 = 8.0;

/// Cubic fitted to omega on the middle band, highest degree first.
pub const OMEGA_APPROX_COEFFS: [f64; 4] = [
    -1.3142931498778e-3,
    4.775931364975583e-2,
    3.631952663804445e-1,
    6.313183464296682e-1,
];

/// Evaluate the Wright omega function for a real argument.
///
/// Starts from a piecewise guess and applies one Fritsch-Shafer-Crowley
/// iteration, plus a second one when the condition estimate says the first
/// has not reached machine precision.
pub fn wright_omega<T: Real>(x: T) -> T {
    if x < T::from_wide(-50.0) {
        // exp(x) is already exact to working precision
        return x.exp();
    }
    if x > T::from_wide(1e20) {
        return x;
    }

    let one = T::one();
    let w = if x < T::from_wide(-2.0) {
        x.exp()
    } else if x < one {
        (T::from_wide(2.0) * (x - one) / T::from_wide(3.0)).exp()
    } else {
        let l = x.ln();
        x - l + l / x
    };

    let (w, r, wp1) = fsc_step(x, w);

    let w_sq = w * w;
    let lhs = ((T::from_wide(2.0) * w_sq - T::from_wide(8.0) * w - one) * r.abs().powi(4)).abs();
    let rhs = T::epsilon() * T::from_wide(72.0) * wp1.abs().powi(6);
    if lhs >= rhs {
        fsc_step(x, w).0
    } else {
        w
    }
}

/// One FSC update. Returns the new estimate with the residual and `w + 1`
/// of the estimate it started from.
#[inline]
fn fsc_step<T: Real>(x: T, w: T) -> (T, T, T) {
    let one = T::one();
    let two = one + one;
    let r = x - w - w.ln();
    let wp1 = w + one;
    let temp = two * wp1 * (wp1 + two / T::from_wide(3.0) * r);
    let e = r / wp1 * (temp - r) / (temp - two * r);
    (w * (one + e), r, wp1)
}

/// Input band of the three-piece omega approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmegaBand {
    /// `x <= OMEGA_APPROX_LOW`: omega is close to `exp(x)`
    Low,
    /// Cubic band between the two thresholds
    Middle,
    /// `x >= OMEGA_APPROX_HIGH`: asymptotic `x - ln(x)`
    High,
}

impl OmegaBand {
    /// Band an argument falls in.
    pub fn classify<T: Real>(x: T) -> Self {
        if x >= T::from_wide(OMEGA_APPROX_HIGH) {
            OmegaBand::High
        } else if x > T::from_wide(OMEGA_APPROX_LOW) {
            OmegaBand::Middle
        } else {
            OmegaBand::Low
        }
    }

    /// First estimate before the correction step.
    pub fn estimate<T: Real>(self, x: T) -> T {
        match self {
            OmegaBand::Low => T::zero(),
            OmegaBand::Middle => {
                let coeffs = OMEGA_APPROX_COEFFS.map(T::from_wide);
                polyval(&coeffs, x)
            }
            OmegaBand::High => x - x.ln(),
        }
    }
}

/// Fast approximation of [`wright_omega`].
///
/// Every band estimate is sharpened by `w - (w - exp(x - w)) / (w + 1)`.
/// In the low band the estimate is zero, so the result is `exp(x)`.
pub fn omega_approx<T: Real>(x: T) -> T {
    let w3 = OmegaBand::classify(x).estimate(x);
    w3 - (w3 - (x - w3).exp()) / (w3 + T::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::lambert_w0;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_points() {
        assert_relative_eq!(wright_omega(1.0f64), 1.0, epsilon = 1e-15);
        assert_relative_eq!(wright_omega(0.0f64), 0.567_143_290_409_783_8, epsilon = 1e-15);
        // omega(e + 1) = e
        let e = std::f64::consts::E;
        assert_relative_eq!(wright_omega(e + 1.0), e, max_relative = 1e-15);
    }

    #[test]
    fn test_matches_lambert_of_exp() {
        for i in -60..=60 {
            let x = i as f64 * 0.5;
            assert_relative_eq!(
                wright_omega(x),
                lambert_w0(x.exp()),
                max_relative = 1e-13,
                epsilon = 1e-300
            );
        }
    }

    #[test]
    fn test_solves_defining_equation() {
        for &x in &[-45.0f64, -3.0, -1.5, 0.5, 4.0, 19.0, 1e3, 1e8] {
            let w = wright_omega(x);
            assert_relative_eq!(w + w.ln(), x, max_relative = 1e-13, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_extreme_arguments() {
        assert_eq!(wright_omega(-80.0f64), (-80.0f64).exp());
        assert_eq!(wright_omega(1e21f64), 1e21);
        // Lambert route overflows here, omega does not
        assert!(lambert_w0(800.0f64.exp()).is_infinite());
        assert!(wright_omega(800.0f64).is_finite());
    }

    #[test]
    fn test_single_precision_tracks_double() {
        for i in -40..=40 {
            let x = i as f64 * 0.5;
            let wide = wright_omega(x);
            let narrow = wright_omega(x as f32) as f64;
            assert_relative_eq!(narrow, wide, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_band_classification() {
        assert_eq!(OmegaBand::classify(OMEGA_APPROX_LOW), OmegaBand::Low);
        assert_eq!(OmegaBand::classify(-3.3f64), OmegaBand::Middle);
        assert_eq!(OmegaBand::classify(7.999f64), OmegaBand::Middle);
        assert_eq!(OmegaBand::classify(OMEGA_APPROX_HIGH), OmegaBand::High);
        assert_eq!(OmegaBand::classify(-100.0f32), OmegaBand::Low);
    }

    #[test]
    fn test_approx_low_band_is_exp() {
        for &x in &[-4.0f64, -10.0, -30.0] {
            assert_relative_eq!(omega_approx(x), x.exp(), max_relative = 1e-15);
        }
    }

    #[test]
    fn test_approx_error_bound() {
        let mut worst = 0.0f64;
        for i in -4000..=6000 {
            let x = i as f64 * 0.01;
            worst = worst.max((omega_approx(x) - wright_omega(x)).abs());
        }
        assert!(worst < 0.05, "worst approximation error {worst}");
    }

    #[test]
    fn test_approx_continuous_at_band_edges() {
        for &edge in &[OMEGA_APPROX_LOW, OMEGA_APPROX_HIGH] {
            let below = omega_approx(edge - 1e-9);
            let above = omega_approx(edge + 1e-9);
            assert!((below - above).abs() < 1e-6, "jump at {edge}: {below} vs {above}");
        }
    }
}
