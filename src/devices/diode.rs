//! Junction diode parameters.

use crate::error::{ClipperError, Result};
use crate::models::{ModelDef, ModelType};
use crate::precision::Real;
use crate::{BOLTZMANN, ELECTRON_CHARGE, ZERO_CELSIUS};

/// SPICE parameters of a junction diode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeParams<T> {
    /// Saturation current (IS), A
    pub is: T,
    /// Emission coefficient (N)
    pub n: T,
    /// Series (parasitic) resistance (RS), ohm
    pub rs: T,
    /// Zero-bias junction capacitance (CJO), F
    pub cjo: T,
    /// Junction potential (VJ), V
    pub vj: T,
    /// Junction grading coefficient (M)
    pub m: T,
    /// Transit time (TT), s
    pub tt: T,
}

impl<T: Real> DiodeParams<T> {
    /// Create a parameter set from SPICE values.
    pub fn new(is: T, n: T, rs: T, cjo: T, vj: T, m: T, tt: T) -> Self {
        Self {
            is,
            n,
            rs,
            cjo,
            vj,
            m,
            tt,
        }
    }

    /// 1N4148 small-signal silicon diode.
    pub fn d1n4148() -> Self {
        Self::new(
            T::from_wide(4.352e-9),
            T::from_wide(1.906),
            T::from_wide(0.6458),
            T::from_wide(7.048e-13),
            T::from_wide(0.869),
            T::from_wide(0.03),
            T::from_wide(3.48e-9),
        )
    }

    /// Build parameters from a `D` model card.
    ///
    /// Absent parameters take their SPICE defaults.
    pub fn from_model(model: &ModelDef) -> Result<Self> {
        if model.model_type != ModelType::Diode {
            return Err(ClipperError::ModelTypeMismatch {
                model: model.name.clone(),
                expected: ModelType::Diode.to_string(),
                found: model.model_type.to_string(),
            });
        }

        Ok(Self::new(
            super::model_param(model, "is", 1e-14),
            super::model_param(model, "n", 1.0),
            super::model_param(model, "rs", 0.0),
            super::model_param(model, "cjo", 0.0),
            super::model_param(model, "vj", 1.0),
            super::model_param(model, "m", 0.5),
            super::model_param(model, "tt", 0.0),
        ))
    }

    /// Copy of this parameter set at another precision.
    pub fn cast<U: Real>(&self) -> DiodeParams<U> {
        DiodeParams {
            is: self.is.cast(),
            n: self.n.cast(),
            rs: self.rs.cast(),
            cjo: self.cjo.cast(),
            vj: self.vj.cast(),
            m: self.m.cast(),
            tt: self.tt.cast(),
        }
    }

    /// Thermal voltage `k (273 + T) / q` at a temperature in degrees Celsius.
    pub fn thermal_voltage(temperature_c: T) -> T {
        let k = T::from_wide(BOLTZMANN);
        let q = T::from_wide(ELECTRON_CHARGE);
        k * (T::from_wide(ZERO_CELSIUS) + temperature_c) / q
    }
}
