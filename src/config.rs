//! Configuration types and validation of user-supplied circuit values.
//!
//! The solvers accept any numbers and return unphysical results for
//! unphysical parameters. Values that come from outside the program (CLI
//! flags, WASM callers) go through the `validate_*` functions first.

use crate::devices::JfetParams;
use crate::error::{ClipperError, Result};
use crate::precision::Real;
use crate::solver::Formulation;

pub use crate::solver::{DiodeConfig, JfetConfig};

/// Largest load resistance a diode stage accepts, ohm.
pub const MAX_LOAD_RESISTANCE: f64 = 1e7;

/// Default length of a parameter morph, in samples (10 ms at 48 kHz).
pub const DEFAULT_MORPH_SAMPLES: usize = 480;

/// Options for the real-time block processors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageOptions {
    /// Diode formulation used per sample
    pub formulation: Formulation,
    /// Scale the diode output so that a 1 V input maps to 1 V
    pub normalize: bool,
    /// Samples over which a load-resistance change is spread
    pub morph_samples: usize,
    /// Junction temperature, degrees Celsius
    pub temperature_c: f64,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            formulation: Formulation::WrightOmega,
            normalize: false,
            morph_samples: DEFAULT_MORPH_SAMPLES,
            temperature_c: crate::DEFAULT_TEMPERATURE_C,
        }
    }
}

impl StageOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diode formulation.
    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.formulation = formulation;
        self
    }

    /// Enable make-up gain normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the morph length in samples. Zero applies changes immediately.
    pub fn with_morph_samples(mut self, morph_samples: usize) -> Self {
        self.morph_samples = morph_samples;
        self
    }

    /// Set the junction temperature (degrees Celsius).
    pub fn with_temperature(mut self, temperature_c: f64) -> Self {
        self.temperature_c = temperature_c;
        self
    }
}

/// Require a finite value.
pub fn validate_finite(param: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ClipperError::invalid_parameter(param, format!("{} is not finite", value)))
    }
}

/// Require a finite value `>= 0`.
pub fn validate_non_negative(param: &str, value: f64) -> Result<f64> {
    let value = validate_finite(param, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ClipperError::invalid_parameter(param, format!("must not be negative, got {}", value)))
    }
}

/// Require a finite value `> 0`.
pub fn validate_positive(param: &str, value: f64) -> Result<f64> {
    let value = validate_finite(param, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ClipperError::invalid_parameter(param, format!("must be positive, got {}", value)))
    }
}

/// Check a diode clipper's load resistance and temperature.
pub fn validate_diode_circuit(load_resistance: f64, temperature_c: f64) -> Result<()> {
    let r = validate_non_negative("load resistance", load_resistance)?;
    if r > MAX_LOAD_RESISTANCE {
        return Err(ClipperError::invalid_parameter(
            "load resistance",
            format!("must not exceed {} ohm, got {}", MAX_LOAD_RESISTANCE, r),
        ));
    }
    let t = validate_finite("temperature", temperature_c)?;
    if t + crate::ZERO_CELSIUS <= 0.0 {
        return Err(ClipperError::invalid_parameter(
            "temperature",
            format!("{} C is below absolute zero", t),
        ));
    }
    Ok(())
}

/// Check a JFET stage before building a solver for it.
///
/// The saturation roots divide by the total source resistance, so it must
/// be positive.
pub fn validate_jfet<T: Real>(params: &JfetParams<T>) -> Result<()> {
    validate_positive("beta", params.beta.to_wide())?;
    validate_non_negative("lambda", params.lambda.to_wide())?;
    validate_finite("vto", params.vto.to_wide())?;
    validate_non_negative("rd", params.rd.to_wide())?;
    validate_non_negative("rs", params.rs.to_wide())?;
    validate_non_negative("device rd", params.rd_device.to_wide())?;
    validate_non_negative("device rs", params.rs_device.to_wide())?;
    validate_positive("total source resistance", params.rs_total().to_wide())?;
    validate_positive("vdd", params.vdd.to_wide())?;
    if params.vto.to_wide() >= 0.0 {
        log::warn!(
            "JFET threshold {} V is not negative; not a depletion-mode N-channel part",
            params.vto
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_options_builder() {
        let o = StageOptions::new()
            .with_formulation(Formulation::OmegaApprox)
            .with_normalize(true)
            .with_morph_samples(0);
        assert_eq!(o.formulation, Formulation::OmegaApprox);
        assert!(o.normalize);
        assert_eq!(o.morph_samples, 0);
        assert_eq!(o.temperature_c, 20.0);
    }

    #[test]
    fn test_diode_circuit_validation() {
        assert!(validate_diode_circuit(0.0, 20.0).is_ok());
        assert!(validate_diode_circuit(1e7, -40.0).is_ok());
        assert!(validate_diode_circuit(-1.0, 20.0).is_err());
        assert!(validate_diode_circuit(2e7, 20.0).is_err());
        assert!(validate_diode_circuit(1e3, f64::NAN).is_err());
        assert!(validate_diode_circuit(1e3, -300.0).is_err());
    }

    #[test]
    fn test_jfet_validation() {
        let good = JfetParams::new(1.304e-3, 2.8e-3, -0.8, 4.4e3, 1e3, 9.0);
        assert!(validate_jfet(&good).is_ok());

        let no_source = JfetParams::new(1.304e-3, 2.8e-3, -0.8, 4.4e3, 0.0, 9.0);
        assert!(validate_jfet(&no_source).is_err());
        assert!(validate_jfet(&no_source.with_device_resistances(0.0, 1.0)).is_ok());

        let no_supply = JfetParams::new(1.304e-3, 2.8e-3, -0.8, 4.4e3, 1e3, 0.0);
        match validate_jfet(&no_supply) {
            Err(ClipperError::InvalidParameter { param, .. }) => assert_eq!(param, "vdd"),
            other => panic!("expected invalid vdd, got {:?}", other),
        }
    }
}
