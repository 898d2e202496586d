//! Floating-point width selection.
//!
//! Every solver is generic over [`Real`], so the same parameter set can be
//! evaluated in narrow (`f32`) or wide (`f64`) precision and the two results
//! compared. [`Precision`] is the runtime selector used by the CLI.

use std::fmt::{Debug, Display};

use num_traits::{Float, FloatConst};

/// Scalar type the solvers are written against.
pub trait Real: Float + FloatConst + Debug + Display + Default + Send + Sync + 'static {
    /// Convert a wide constant into this precision (rounding for `f32`).
    fn from_wide(value: f64) -> Self;

    /// Widen this value to `f64`.
    fn to_wide(self) -> f64;

    /// Convert between precisions through `f64`.
    #[inline]
    fn cast<U: Real>(self) -> U {
        U::from_wide(self.to_wide())
    }

    /// Sign with `sgn(0) = 0`, unlike [`Float::signum`].
    #[inline]
    fn sgn(self) -> Self {
        if self > Self::zero() {
            Self::one()
        } else if self < Self::zero() {
            -Self::one()
        } else {
            Self::zero()
        }
    }
}

impl Real for f32 {
    #[inline]
    fn from_wide(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_wide(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    #[inline]
    fn from_wide(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_wide(self) -> f64 {
        self
    }
}

/// Convert a slice of samples to another precision.
pub fn cast_slice<T: Real, U: Real>(values: &[T]) -> Vec<U> {
    values.iter().map(|&v| v.cast::<U>()).collect()
}

/// Floating-point width used for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Precision {
    /// 32-bit floats
    Single,
    /// 64-bit floats
    Double,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgn_zero_is_zero() {
        assert_eq!(0.0f64.sgn(), 0.0);
        assert_eq!((-0.0f32).sgn(), 0.0);
        assert_eq!(2.5f64.sgn(), 1.0);
        assert_eq!((-1e-30f32).sgn(), -1.0);
    }

    #[test]
    fn test_cast_rounds_to_narrow() {
        let wide = 0.1f64;
        let narrow: f32 = wide.cast();
        assert_eq!(narrow, 0.1f32);
        assert_eq!(narrow.cast::<f64>(), 0.1f32 as f64);
    }
}
