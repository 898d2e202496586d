//! Physical device parameters.
//!
//! - [`DiodeParams`] - SPICE junction diode parameters
//! - [`JfetParams`] - SPICE level-1 JFET parameters plus the surrounding
//!   drain/source resistors and supply, and the [`RegionPolynomials`]
//!   derived from them
//!
//! Parameter sets are plain immutable values, generic over the float width.
//! `cast` produces an independent copy at another precision.

mod diode;
mod jfet;

pub use diode::DiodeParams;
pub use jfet::{JfetParams, RegionPolynomials};

use crate::models::ModelDef;
use crate::precision::Real;

/// Read a model parameter, falling back to the SPICE default.
fn model_param<T: Real>(model: &ModelDef, name: &str, default: f64) -> T {
    T::from_wide(model.params.get(name).copied().unwrap_or(default))
}
