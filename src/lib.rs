//! # Clipper Core
//!
//! Per-sample solvers for nonlinear guitar-pedal stages.
//!
//! This library provides:
//! - A diode clipper solver with five interchangeable closed-form
//!   formulations (Lambert W, Wright omega and a fast omega approximation)
//! - A common-source JFET stage solver with operating-region selection and
//!   fixed-step Newton-Raphson refinement for channel-length modulation
//! - SPICE `.model` card parsing for device parameters
//! - Real-time block processors and an audio pipeline for the CLI
//!
//! ## Architecture
//!
//! - [`devices`] - Diode and JFET parameter sets, generic over precision
//! - [`math`] - Lambert W, Wright omega and polynomial helpers
//! - [`solver`] - The diode and JFET solvers
//! - [`models`] - Parser for SPICE model cards
//! - [`stage`] - Block processors wrapping the solvers for audio use
//! - [`analysis`] - Test signals and accuracy reports
//! - [`audio`] - Audio I/O (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | clipper diode --model 1N4148 | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! ```
//!
//! ### Library
//!
//! ```
//! use clipper_core::devices::DiodeParams;
//! use clipper_core::solver::{DiodeSolver, Formulation};
//!
//! let solver = DiodeSolver::new(DiodeParams::<f32>::d1n4148(), 1e3, 20.0);
//! let out = solver.process(Formulation::OmegaApprox, &[0.0, 0.5, 1.0]);
//! assert_eq!(out.len(), 3);
//! ```
//!
//! ## Solution Method
//!
//! Neither solver iterates to convergence. The diode pair has an exact
//! solution in terms of Lambert W, rewritten through Wright omega so that no
//! intermediate exponential can overflow. The JFET stage takes the two
//! square-law roots of each operating region, keeps the first that is
//! physically consistent, and applies a fixed number of Newton steps to
//! account for channel-length modulation. Every sample is independent, and
//! solvers hold no mutable state.

pub mod analysis;
pub mod config;
pub mod devices;
pub mod error;
pub mod math;
pub mod models;
pub mod precision;
pub mod solver;
pub mod stage;

#[cfg(feature = "cli")]
pub mod audio;

// Re-export main types for convenience
pub use devices::{DiodeParams, JfetParams};
pub use error::{ClipperError, Result};
pub use precision::{Precision, Real};
pub use solver::{DiodeSolver, Formulation, JfetSolver};
pub use stage::{BlockProcessor, DiodeStage, JfetStage};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::{WasmDiodeStage, WasmJfetStage};

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Default junction temperature in degrees Celsius
pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;

/// Boltzmann constant, J/K
pub const BOLTZMANN: f64 = 1.38e-23;

/// Elementary charge, C
pub const ELECTRON_CHARGE: f64 = 1.6e-19;

/// Offset from Celsius to Kelvin
pub const ZERO_CELSIUS: f64 = 273.0;
