//! JFET stage parameters and the region polynomials derived from them.
//!
//! The stage is a common-source N-channel JFET with a drain resistor to the
//! supply and a source resistor to ground. With `Vds = VDD - Id * RDS`
//! (`RDS = RD + RS`) and gate overdrive `Vgt = Vin - VTO`, the drain current
//! satisfies, including channel-length modulation `(1 + LAMBDA * Vds)`:
//!
//! ```text
//! triode:      Id = 2 BETA (1 + LAMBDA Vds) ((Vgt - Id RS) Vds - Vds^2 / 2)
//! saturation:  Id =   BETA (1 + LAMBDA Vds) (Vgt - Id RS)^2
//! ```
//!
//! Moving everything to one side gives a cubic in `Id` per region whose
//! coefficients are polynomials in `Vgt`. They are stored as
//! [`AffinePolynomial`]s so per-sample coefficients are a pure function of
//! `Vgt`.

use crate::error::{ClipperError, Result};
use crate::math::AffinePolynomial;
use crate::models::{ModelDef, ModelType};
use crate::precision::Real;

/// Parameters of a resistively loaded common-source JFET stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JfetParams<T> {
    /// Transconductance coefficient (BETA), A/V^2
    pub beta: T,
    /// Channel-length modulation (LAMBDA), 1/V
    pub lambda: T,
    /// Threshold voltage (VTO), V
    pub vto: T,
    /// External drain resistor, ohm
    pub rd: T,
    /// External source resistor, ohm
    pub rs: T,
    /// Drain ohmic resistance inside the device (RD), ohm
    pub rd_device: T,
    /// Source ohmic resistance inside the device (RS), ohm
    pub rs_device: T,
    /// Supply voltage, V
    pub vdd: T,
}

impl<T: Real> JfetParams<T> {
    /// Create a stage with ideal (zero-resistance) device terminals.
    pub fn new(beta: T, lambda: T, vto: T, rd: T, rs: T, vdd: T) -> Self {
        Self {
            beta,
            lambda,
            vto,
            rd,
            rs,
            rd_device: T::zero(),
            rs_device: T::zero(),
            vdd,
        }
    }

    /// Set the ohmic resistances internal to the device.
    pub fn with_device_resistances(mut self, rd_device: T, rs_device: T) -> Self {
        self.rd_device = rd_device;
        self.rs_device = rs_device;
        self
    }

    /// Build a stage around an `NJF` model card.
    ///
    /// BETA, LAMBDA, VTO, RD and RS come from the card (SPICE defaults when
    /// absent); `rd`, `rs` and `vdd` describe the external circuit.
    pub fn from_model(model: &ModelDef, rd: T, rs: T, vdd: T) -> Result<Self> {
        match model.model_type {
            ModelType::NJfet => {}
            ModelType::PJfet => {
                return Err(ClipperError::UnsupportedModel {
                    model: model.name.clone(),
                    message: "only N-channel JFET stages are modeled".to_string(),
                });
            }
            other => {
                return Err(ClipperError::ModelTypeMismatch {
                    model: model.name.clone(),
                    expected: ModelType::NJfet.to_string(),
                    found: other.to_string(),
                });
            }
        }

        Ok(Self::new(
            super::model_param(model, "beta", 1e-4),
            super::model_param(model, "lambda", 0.0),
            super::model_param(model, "vto", -2.0),
            rd,
            rs,
            vdd,
        )
        .with_device_resistances(
            super::model_param(model, "rd", 0.0),
            super::model_param(model, "rs", 0.0),
        ))
    }

    /// Copy of this parameter set at another precision.
    pub fn cast<U: Real>(&self) -> JfetParams<U> {
        JfetParams {
            beta: self.beta.cast(),
            lambda: self.lambda.cast(),
            vto: self.vto.cast(),
            rd: self.rd.cast(),
            rs: self.rs.cast(),
            rd_device: self.rd_device.cast(),
            rs_device: self.rs_device.cast(),
            vdd: self.vdd.cast(),
        }
    }

    /// Total drain-side resistance.
    #[inline]
    pub fn rd_total(&self) -> T {
        self.rd + self.rd_device
    }

    /// Total source-side resistance.
    #[inline]
    pub fn rs_total(&self) -> T {
        self.rs + self.rs_device
    }

    /// Total resistance in series with the channel.
    #[inline]
    pub fn rds_total(&self) -> T {
        self.rd_total() + self.rs_total()
    }

    /// Derive the per-region cubic polynomials and their derivatives.
    pub fn polynomials(&self) -> RegionPolynomials<T> {
        RegionPolynomials::new(self)
    }
}

/// Drain-current polynomials of both operating regions.
///
/// Each polynomial is in `Id`, highest degree first, with coefficients that
/// depend on the gate overdrive `Vgt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPolynomials<T> {
    /// Triode cubic
    pub triode: AffinePolynomial<T, 4>,
    /// First derivative of the triode cubic
    pub triode_derivative: AffinePolynomial<T, 3>,
    /// Saturation cubic (constant term is zero at `Vgt = 0`)
    pub saturation: AffinePolynomial<T, 4>,
    /// First derivative of the saturation cubic
    pub saturation_derivative: AffinePolynomial<T, 3>,
}

impl<T: Real> RegionPolynomials<T> {
    /// Derive the coefficients from a parameter set.
    pub fn new(params: &JfetParams<T>) -> Self {
        let zero = T::zero();
        let one = T::one();
        let c = |v: f64| T::from_wide(v);

        let beta = params.beta;
        let lambda = params.lambda;
        let vdd = params.vdd;
        let rs = params.rs_total();
        let rds = params.rds_total();

        let rds_sq = rds * rds;
        let rs_sq = rs * rs;
        let vdd_sq = vdd * vdd;

        let t3 = beta * lambda * rds_sq * (-rds + c(2.0) * rs);
        let t2 = beta
            * rds
            * (c(3.0) * lambda * rds * vdd - c(4.0) * lambda * rs * vdd + rds - c(2.0) * rs);
        let t1 = -c(3.0) * beta * lambda * rds * vdd_sq + c(2.0) * beta * lambda * rs * vdd_sq
            - c(2.0) * beta * rds * vdd
            + c(2.0) * beta * rs * vdd
            + one;
        let t0 = beta * vdd_sq * (lambda * vdd + one);

        let t2_v = -c(2.0) * beta * lambda * rds_sq;
        let t1_v = c(2.0) * beta * rds * (c(2.0) * lambda * vdd + one);
        let t0_v = c(2.0) * beta * vdd * (-lambda * vdd - one);

        let triode = AffinePolynomial::linear([t3, t2, t1, t0], [zero, t2_v, t1_v, t0_v]);
        let triode_derivative = AffinePolynomial::linear(
            [c(3.0) * t3, c(2.0) * t2, t1],
            [zero, c(2.0) * t2_v, t1_v],
        );

        let s3 = beta * lambda * rds * rs_sq;
        let s2 = beta * rs_sq * (-lambda * vdd - one);
        let s2_v = -c(2.0) * beta * lambda * rds * rs;
        let s1_v = c(2.0) * beta * rs * (lambda * vdd + one);
        let s1_v2 = beta * lambda * rds;
        let s0_v2 = beta * (-lambda * vdd - one);

        let saturation = AffinePolynomial::new(
            [s3, s2, one, zero],
            [zero, s2_v, s1_v, zero],
            [zero, zero, s1_v2, s0_v2],
        );
        let saturation_derivative = AffinePolynomial::new(
            [c(3.0) * s3, c(2.0) * s2, one],
            [zero, c(2.0) * s2_v, s1_v],
            [zero, zero, s1_v2],
        );

        Self {
            triode,
            triode_derivative,
            saturation,
            saturation_derivative,
        }
    }

    /// Same polynomials at another precision.
    pub fn cast<U: Real>(&self) -> RegionPolynomials<U> {
        RegionPolynomials {
            triode: self.triode.cast(),
            triode_derivative: self.triode_derivative.cast(),
            saturation: self.saturation.cast(),
            saturation_derivative: self.saturation_derivative.cast(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn j201() -> JfetParams<f64> {
        JfetParams::new(1.304e-3, 2.8e-3, -0.8, 4.4e3, 1e3, 9.0).with_device_resistances(1.0, 1.0)
    }

    /// Direct evaluation of the region equations, written as residuals.
    fn triode_residual(p: &JfetParams<f64>, vgt: f64, id: f64) -> f64 {
        let vds = p.vdd - id * p.rds_total();
        id - 2.0 * p.beta * (1.0 + p.lambda * vds) * ((vgt - id * p.rs_total()) * vds - vds * vds / 2.0)
    }

    fn saturation_residual(p: &JfetParams<f64>, vgt: f64, id: f64) -> f64 {
        let vds = p.vdd - id * p.rds_total();
        let v = vgt - id * p.rs_total();
        id - p.beta * (1.0 + p.lambda * vds) * v * v
    }

    #[test]
    fn test_polynomials_match_region_equations() {
        let p = j201();
        let polys = p.polynomials();
        for &vgt in &[0.1, 0.8, 2.1] {
            for &id in &[0.0, 1e-4, 5e-4, 1.2e-3] {
                assert_relative_eq!(
                    polys.triode.eval(vgt, id),
                    triode_residual(&p, vgt, id),
                    max_relative = 1e-9,
                    epsilon = 1e-12
                );
                assert_relative_eq!(
                    polys.saturation.eval(vgt, id),
                    saturation_residual(&p, vgt, id),
                    max_relative = 1e-9,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let polys = j201().polynomials();
        let h = 1e-9;
        for &vgt in &[0.3, 1.5] {
            for &id in &[2e-4, 7e-4] {
                let fd_t = (polys.triode.eval(vgt, id + h) - polys.triode.eval(vgt, id - h)) / (2.0 * h);
                let fd_s =
                    (polys.saturation.eval(vgt, id + h) - polys.saturation.eval(vgt, id - h)) / (2.0 * h);
                assert_relative_eq!(polys.triode_derivative.eval(vgt, id), fd_t, max_relative = 1e-5);
                assert_relative_eq!(polys.saturation_derivative.eval(vgt, id), fd_s, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_totals_include_device_resistance() {
        let p = j201();
        assert_eq!(p.rd_total(), 4401.0);
        assert_eq!(p.rs_total(), 1001.0);
        assert_eq!(p.rds_total(), 5402.0);
    }

    #[test]
    fn test_from_model() {
        let lib = crate::models::parse(".model JX NJF(BETA=1.304m LAMBDA=2.8m VTO=-.8 RD=1 RS=1)").unwrap();
        let p = JfetParams::<f64>::from_model(lib.get("jx").unwrap(), 4.4e3, 1e3, 9.0).unwrap();
        assert_relative_eq!(p.beta, 1.304e-3, max_relative = 1e-12);
        assert_relative_eq!(p.vto, -0.8);
        assert_eq!(p.rd_device, 1.0);
        assert_eq!(p.rs, 1e3);
    }

    #[test]
    fn test_from_model_rejects_p_channel() {
        let lib = crate::models::parse(".model JP PJF(BETA=1m VTO=2)").unwrap();
        let err = JfetParams::<f64>::from_model(lib.get("JP").unwrap(), 1e3, 1e3, 9.0).unwrap_err();
        assert!(matches!(err, ClipperError::UnsupportedModel { .. }));
    }
}
