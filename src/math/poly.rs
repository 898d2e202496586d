//! Polynomial evaluation.

use crate::precision::Real;

/// Evaluate a polynomial with coefficients ordered highest degree first.
#[inline]
pub fn polyval<T: Real>(coeffs: &[T], x: T) -> T {
    coeffs.iter().fold(T::zero(), |acc, &c| acc * x + c)
}

/// Polynomial whose coefficients depend on a driving variable `v`:
/// `c[i] = base[i] + linear[i] * v + quadratic[i] * v^2`.
///
/// Coefficients are ordered highest degree first, as for [`polyval`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffinePolynomial<T, const N: usize> {
    /// Coefficients at `v = 0`
    pub base: [T; N],
    /// Multipliers of `v`
    pub linear: [T; N],
    /// Multipliers of `v^2`
    pub quadratic: [T; N],
}

impl<T: Real, const N: usize> AffinePolynomial<T, N> {
    /// Create a polynomial with linear and quadratic dependence on `v`.
    pub fn new(base: [T; N], linear: [T; N], quadratic: [T; N]) -> Self {
        Self {
            base,
            linear,
            quadratic,
        }
    }

    /// Create a polynomial with only linear dependence on `v`.
    pub fn linear(base: [T; N], linear: [T; N]) -> Self {
        Self::new(base, linear, [T::zero(); N])
    }

    /// Concrete coefficients for one value of `v`.
    #[inline]
    pub fn at(&self, v: T) -> [T; N] {
        let v_sq = v * v;
        std::array::from_fn(|i| self.base[i] + self.linear[i] * v + self.quadratic[i] * v_sq)
    }

    /// Evaluate at `x` for a given `v`.
    #[inline]
    pub fn eval(&self, v: T, x: T) -> T {
        polyval(&self.at(v), x)
    }

    /// Same polynomial at another precision.
    pub fn cast<U: Real>(&self) -> AffinePolynomial<U, N> {
        AffinePolynomial {
            base: self.base.map(|c| c.cast()),
            linear: self.linear.map(|c| c.cast()),
            quadratic: self.quadratic.map(|c| c.cast()),
        }
    }
}
