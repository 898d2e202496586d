//! Per-sample circuit solvers.
//!
//! Both solver families map an input voltage to the response of a small,
//! fixed circuit without iterating to convergence:
//!
//! - [`DiodeSolver`] - antiparallel diode pair behind a series resistor,
//!   solved in closed form through Lambert W or Wright omega
//! - [`JfetSolver`] - common-source JFET stage with drain and source
//!   resistors, solved per operating region from closed-form quadratic
//!   roots and refined with a fixed number of Newton steps
//!
//! ## Root selection
//!
//! A quadratic yields two candidate currents. Index 0 is the `-sqrt(D)`
//! branch and index 1 the `+sqrt(D)` branch; [`first_valid`] always tries
//! index 0 first, even when both satisfy the region's validity test.
//!
//! Solvers are immutable after construction, so one instance can be shared
//! by reference between threads and reused for any number of blocks.

mod diode;
mod jfet;
mod newton;
mod region;

pub use diode::{
    DiodeCoefficients, DiodeConfig, DiodeObservables, DiodeResponse, DiodeSolver, Formulation,
};
pub use jfet::{
    JfetConfig, JfetResponse, JfetSample, JfetSolver, OperatingPoint, Region, RegionCandidates,
};
pub use newton::NewtonRaphson;
pub use region::{first_valid, Branch};

/// Default series load resistance of the diode clipper, ohm.
pub const DEFAULT_LOAD_RESISTANCE: f64 = 1e3;

/// Newton-Raphson steps applied to each JFET root candidate.
pub const DEFAULT_NEWTON_STEPS: usize = 2;
