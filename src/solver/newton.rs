//! Fixed-step Newton-Raphson refinement.

use crate::math::{polyval, AffinePolynomial};
use crate::precision::Real;

use super::DEFAULT_NEWTON_STEPS;

/// Newton-Raphson refinement with a fixed step count.
///
/// There is no convergence test: the number of steps is part of the
/// solver's observable behaviour, so results do not depend on a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewtonRaphson {
    /// Steps applied to every starting point
    pub steps: usize,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        Self::new()
    }
}

impl NewtonRaphson {
    /// Create a refiner with the default step count.
    pub fn new() -> Self {
        Self::with_steps(DEFAULT_NEWTON_STEPS)
    }

    /// Create a refiner with a custom step count.
    pub fn with_steps(steps: usize) -> Self {
        Self { steps }
    }

    /// Refine `x0` towards a root of `f(v, x)` using its derivative `df`.
    ///
    /// A step whose result is not finite (zero derivative) is skipped.
    pub fn refine<T: Real, const N: usize, const M: usize>(
        &self,
        f: &AffinePolynomial<T, N>,
        df: &AffinePolynomial<T, M>,
        v: T,
        x0: T,
    ) -> T {
        let p = f.at(v);
        let dp = df.at(v);
        let mut x = x0;
        for _ in 0..self.steps {
            let next = x - polyval(&p, x) / polyval(&dp, x);
            if next.is_finite() {
                x = next;
            }
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_minus_two() -> (AffinePolynomial<f64, 3>, AffinePolynomial<f64, 2>) {
        // x^2 - v, derivative 2x
        (
            AffinePolynomial::linear([1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            AffinePolynomial::linear([2.0, 0.0], [0.0, 0.0]),
        )
    }

    #[test]
    fn test_step_count_is_exact() {
        let (f, df) = square_minus_two();
        assert_eq!(NewtonRaphson::with_steps(0).refine(&f, &df, 2.0, 1.0), 1.0);
        assert_eq!(NewtonRaphson::with_steps(1).refine(&f, &df, 2.0, 1.0), 1.5);
        assert_relative_eq!(
            NewtonRaphson::with_steps(2).refine(&f, &df, 2.0, 1.0),
            17.0 / 12.0,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            NewtonRaphson::with_steps(6).refine(&f, &df, 2.0, 1.0),
            2.0f64.sqrt(),
            max_relative = 1e-15
        );
    }

    #[test]
    fn test_zero_derivative_keeps_previous() {
        let (f, df) = square_minus_two();
        assert_eq!(NewtonRaphson::new().refine(&f, &df, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_default_steps() {
        assert_eq!(NewtonRaphson::default().steps, 2);
    }
}
