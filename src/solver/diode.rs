//! Antiparallel diode clipper.
//!
//! The circuit is an input source driving a pair of antiparallel diodes
//! through a load resistor `R`. With the diode series resistance `RS`,
//! thermal voltage `Vt` and emission coefficient `N`:
//!
//! ```text
//! a0 = IS (R + RS)
//! a1 = 1 / (N Vt)
//! ```
//!
//! and the voltage across the pair has closed forms through Lambert W or,
//! equivalently and without the inner exponential, through Wright omega.

use std::fmt;

use crate::devices::DiodeParams;
use crate::error::{ClipperError, Result};
use crate::math::{lambert_w0, omega_approx, wright_omega};
use crate::precision::Real;

use super::DEFAULT_LOAD_RESISTANCE;

/// Closed-form solution used for the diode pair.
///
/// All five agree up to approximation error. The Lambert W forms build the
/// argument `a0 a1 exp(a1 (...))`, which overflows for large inputs (around
/// 4 V in `f32` for a 1N4148); prefer [`Formulation::WrightOmega`] or
/// [`Formulation::OmegaApprox`] when the input range is not bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Formulation {
    /// Single diode, exact, through Lambert W
    OneDiode,
    /// Antiparallel pair with reverse leakage, exact, through Lambert W
    TwoDiode,
    /// Antiparallel pair without reverse leakage, through Lambert W
    TwoDiodeSimplified,
    /// Antiparallel pair without reverse leakage, through Wright omega
    #[default]
    WrightOmega,
    /// As `WrightOmega` with the three-band cubic approximation of omega
    OmegaApprox,
}

impl Formulation {
    /// Every formulation, in declaration order.
    pub const ALL: [Formulation; 5] = [
        Formulation::OneDiode,
        Formulation::TwoDiode,
        Formulation::TwoDiodeSimplified,
        Formulation::WrightOmega,
        Formulation::OmegaApprox,
    ];

    /// Short name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Formulation::OneDiode => "one-diode",
            Formulation::TwoDiode => "two-diode",
            Formulation::TwoDiodeSimplified => "two-diode-simplified",
            Formulation::WrightOmega => "wright-omega",
            Formulation::OmegaApprox => "omega-approx",
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Circuit around the diode pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeConfig<T> {
    /// Series load resistance, ohm
    pub load_resistance: T,
    /// Junction temperature, degrees Celsius
    pub temperature_c: T,
}

impl<T: Real> Default for DiodeConfig<T> {
    fn default() -> Self {
        Self {
            load_resistance: T::from_wide(DEFAULT_LOAD_RESISTANCE),
            temperature_c: T::from_wide(crate::DEFAULT_TEMPERATURE_C),
        }
    }
}

impl<T: Real> DiodeConfig<T> {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the series load resistance (ohm). Zero is allowed.
    pub fn with_load_resistance(mut self, load_resistance: T) -> Self {
        self.load_resistance = load_resistance;
        self
    }

    /// Set the junction temperature (degrees Celsius).
    pub fn with_temperature(mut self, temperature_c: T) -> Self {
        self.temperature_c = temperature_c;
        self
    }

    /// Same configuration at another precision.
    pub fn cast<U: Real>(&self) -> DiodeConfig<U> {
        DiodeConfig {
            load_resistance: self.load_resistance.cast(),
            temperature_c: self.temperature_c.cast(),
        }
    }
}

/// Constants of the closed-form solutions for one circuit.
///
/// Kept separate from [`DiodeSolver`] so a real-time stage can move `a0`
/// and `ln(a0 a1)` smoothly when the load resistance changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeCoefficients<T> {
    /// Thermal voltage, V
    pub vt: T,
    /// `IS (R + RS)`, V
    pub a0: T,
    /// `1 / (N Vt)`, 1/V
    pub a1: T,
    /// `ln(a0 a1)`
    pub log_a0a1: T,
    /// Saturation current, A
    pub is: T,
}

impl<T: Real> DiodeCoefficients<T> {
    /// Derive the coefficients for a diode, load resistance and temperature.
    pub fn new(params: &DiodeParams<T>, load_resistance: T, temperature_c: T) -> Self {
        let vt = DiodeParams::thermal_voltage(temperature_c);
        let a0 = params.is * (load_resistance + params.rs);
        let a1 = T::one() / (params.n * vt);
        Self {
            vt,
            a0,
            a1,
            log_a0a1: (a0 * a1).ln(),
            is: params.is,
        }
    }

    /// Coefficients for another load resistance, same diode and temperature.
    pub fn with_load(&self, params: &DiodeParams<T>, load_resistance: T) -> Self {
        let a0 = params.is * (load_resistance + params.rs);
        Self {
            a0,
            log_a0a1: (a0 * self.a1).ln(),
            ..*self
        }
    }

    /// Output voltage for one input sample.
    #[inline]
    pub fn solve(&self, formulation: Formulation, vin: T) -> T {
        match formulation {
            Formulation::OneDiode => self.one_diode(vin),
            Formulation::TwoDiode => self.two_diode(vin),
            Formulation::TwoDiodeSimplified => self.two_diode_simplified(vin),
            Formulation::WrightOmega => self.omega_form(vin, wright_omega),
            Formulation::OmegaApprox => self.omega_form(vin, omega_approx),
        }
    }

    fn one_diode(&self, vin: T) -> T {
        let a0a1 = self.a0 * self.a1;
        vin + self.a0 - lambert_w0(a0a1 * (self.a1 * (self.a0 + vin)).exp()) / self.a1
    }

    fn two_diode(&self, vin: T) -> T {
        let leakage = self.is * ((-self.a1 * vin.max(T::zero())).exp() - T::one());
        self.lambert_pair(vin, leakage)
    }

    fn two_diode_simplified(&self, vin: T) -> T {
        self.lambert_pair(vin, T::zero())
    }

    fn lambert_pair(&self, vin: T, leakage: T) -> T {
        let a0a1 = self.a0 * self.a1;
        let u = vin.abs() + self.a0 + leakage;
        vin.sgn() * (u - lambert_w0(a0a1 * (self.a1 * u).exp()) / self.a1)
    }

    fn omega_form(&self, vin: T, omega: fn(T) -> T) -> T {
        let u = vin.abs() + self.a0;
        let x = self.a1 * u + self.log_a0a1;
        vin.sgn() * (u - omega(x) / self.a1)
    }
}

/// Current and small-signal figures at one operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeObservables<T> {
    /// Voltage across the pair from the exact two-diode solution, V
    pub voltage: T,
    /// Current through the load, A
    pub current: T,
    /// Diffusion plus junction capacitance, F
    pub capacitance: T,
    /// `(R + RS) * capacitance`, s
    pub time_constant: T,
    /// Corner frequency of that time constant, Hz
    pub cutoff_hz: T,
}

/// Every formulation evaluated over one input array, plus observables.
#[derive(Debug, Clone, PartialEq)]
pub struct DiodeResponse<T> {
    pub one_diode: Vec<T>,
    pub two_diode: Vec<T>,
    pub two_diode_simplified: Vec<T>,
    pub wright_omega: Vec<T>,
    pub omega_approx: Vec<T>,
    pub current: Vec<T>,
    pub cutoff_hz: Vec<T>,
}

impl<T> DiodeResponse<T> {
    /// Output of one formulation.
    pub fn output(&self, formulation: Formulation) -> &[T] {
        match formulation {
            Formulation::OneDiode => &self.one_diode,
            Formulation::TwoDiode => &self.two_diode,
            Formulation::TwoDiodeSimplified => &self.two_diode_simplified,
            Formulation::WrightOmega => &self.wright_omega,
            Formulation::OmegaApprox => &self.omega_approx,
        }
    }
}

/// Diode clipper solver for one diode model and circuit.
#[derive(Debug, Clone)]
pub struct DiodeSolver<T> {
    params: DiodeParams<T>,
    config: DiodeConfig<T>,
    coefficients: DiodeCoefficients<T>,
}

impl<T: Real> DiodeSolver<T> {
    /// Create a solver for a load resistance (ohm) and temperature (Celsius).
    pub fn new(params: DiodeParams<T>, load_resistance: T, temperature_c: T) -> Self {
        Self::with_config(
            params,
            DiodeConfig::new()
                .with_load_resistance(load_resistance)
                .with_temperature(temperature_c),
        )
    }

    /// Create a solver from a configuration.
    pub fn with_config(params: DiodeParams<T>, config: DiodeConfig<T>) -> Self {
        let coefficients =
            DiodeCoefficients::new(&params, config.load_resistance, config.temperature_c);
        log::debug!(
            "diode solver: R={} T={}C Vt={} a0={} a1={}",
            config.load_resistance,
            config.temperature_c,
            coefficients.vt,
            coefficients.a0,
            coefficients.a1
        );
        Self {
            params,
            config,
            coefficients,
        }
    }

    /// Device parameters.
    pub fn params(&self) -> &DiodeParams<T> {
        &self.params
    }

    /// Circuit configuration.
    pub fn config(&self) -> &DiodeConfig<T> {
        &self.config
    }

    /// Derived constants.
    pub fn coefficients(&self) -> &DiodeCoefficients<T> {
        &self.coefficients
    }

    /// Output voltage for one input sample.
    #[inline]
    pub fn solve(&self, formulation: Formulation, vin: T) -> T {
        self.coefficients.solve(formulation, vin)
    }

    /// Output voltages for a batch of input samples.
    pub fn process(&self, formulation: Formulation, input: &[T]) -> Vec<T> {
        input.iter().map(|&v| self.solve(formulation, v)).collect()
    }

    /// Write output voltages into a buffer of the same length as `input`.
    pub fn process_into(&self, formulation: Formulation, input: &[T], output: &mut [T]) -> Result<()> {
        ClipperError::check_lengths(input.len(), output.len())?;
        for (out, &v) in output.iter_mut().zip(input) {
            *out = self.solve(formulation, v);
        }
        Ok(())
    }

    /// Current and cutoff estimate at one input sample, from the exact
    /// two-diode solution.
    pub fn observe(&self, vin: T) -> DiodeObservables<T> {
        let p = &self.params;
        let c = &self.coefficients;
        let resistance = self.config.load_resistance + p.rs;

        let voltage = c.solve(Formulation::TwoDiode, vin);
        let current = (vin - voltage) / resistance;
        let capacitance = p.tt / c.vt * current + p.cjo / (T::one() - voltage / p.vj).powf(p.m);
        let time_constant = resistance * capacitance;
        let cutoff_hz = (T::one() / (T::TAU() * time_constant)).abs();

        DiodeObservables {
            voltage,
            current,
            capacitance,
            time_constant,
            cutoff_hz,
        }
    }

    /// Evaluate every formulation and the observables over `input`.
    pub fn evaluate(&self, input: &[T]) -> DiodeResponse<T> {
        let observed: Vec<DiodeObservables<T>> = input.iter().map(|&v| self.observe(v)).collect();
        DiodeResponse {
            one_diode: self.process(Formulation::OneDiode, input),
            two_diode: observed.iter().map(|o| o.voltage).collect(),
            two_diode_simplified: self.process(Formulation::TwoDiodeSimplified, input),
            wright_omega: self.process(Formulation::WrightOmega, input),
            omega_approx: self.process(Formulation::OmegaApprox, input),
            current: observed.iter().map(|o| o.current).collect(),
            cutoff_hz: observed.iter().map(|o| o.cutoff_hz).collect(),
        }
    }

    /// Same solver at another precision.
    pub fn cast<U: Real>(&self) -> DiodeSolver<U> {
        DiodeSolver::with_config(self.params.cast(), self.config.cast())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver(r: f64) -> DiodeSolver<f64> {
        DiodeSolver::new(DiodeParams::d1n4148(), r, 20.0)
    }

    #[test]
    fn test_zero_input_gives_zero_output() {
        let s = solver(1e3);
        for f in Formulation::ALL {
            if f == Formulation::OneDiode {
                continue;
            }
            assert_eq!(s.solve(f, 0.0), 0.0, "{}", f);
        }
        assert!(s.solve(Formulation::OneDiode, 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_signal_passes_through() {
        let s = solver(1e3);
        let y = s.solve(Formulation::WrightOmega, 0.01);
        assert_relative_eq!(y, 0.01, max_relative = 1e-3);
    }

    #[test]
    fn test_large_signal_clips() {
        let s = solver(1e3);
        let y = s.solve(Formulation::WrightOmega, 1.0);
        assert!(y > 0.45 && y < 0.65, "clipped level {}", y);
        let y5 = s.solve(Formulation::WrightOmega, 5.0);
        assert!(y5 > y && y5 < 0.8);
    }

    #[test]
    fn test_exact_forms_agree() {
        let s = solver(1e3);
        for i in -30..=30 {
            let v = i as f64 * 0.1;
            let exact = s.solve(Formulation::TwoDiode, v);
            assert!((s.solve(Formulation::TwoDiodeSimplified, v) - exact).abs() < 1e-7);
            assert!((s.solve(Formulation::WrightOmega, v) - exact).abs() < 1e-7);
            assert!((s.solve(Formulation::OmegaApprox, v) - exact).abs() < 5e-3);
        }
    }

    #[test]
    fn test_one_diode_matches_pair_for_positive_input() {
        let s = solver(1e3);
        for &v in &[0.2, 0.6, 1.0, 2.0] {
            assert_relative_eq!(
                s.solve(Formulation::OneDiode, v),
                s.solve(Formulation::TwoDiodeSimplified, v),
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn test_odd_symmetry() {
        let s = solver(1e4);
        for &v in &[0.05, 0.4, 1.3, 7.0] {
            for f in [Formulation::TwoDiodeSimplified, Formulation::WrightOmega, Formulation::OmegaApprox] {
                assert_eq!(s.solve(f, -v), -s.solve(f, v));
            }
        }
    }

    #[test]
    fn test_zero_load_resistance_is_finite() {
        let s = solver(0.0);
        for f in Formulation::ALL {
            let y = s.solve(f, 0.3);
            assert!(y.is_finite(), "{}", f);
            assert!((y - 0.3).abs() < 1e-4, "{} gave {}", f, y);
        }
        assert!(s.observe(0.3).current.is_finite());
    }

    #[test]
    fn test_lambert_path_overflows_where_omega_does_not() {
        let s = solver(1e3);
        assert!(!s.solve(Formulation::TwoDiodeSimplified, 100.0).is_finite());
        let y = s.solve(Formulation::WrightOmega, 100.0);
        assert!(y.is_finite() && y > 0.5 && y < 1.0);
        assert!(s.solve(Formulation::OmegaApprox, 100.0).is_finite());
    }

    #[test]
    fn test_observables() {
        let s = solver(1e3);
        let o = s.observe(1.0);
        assert_relative_eq!(o.current, (1.0 - o.voltage) / (1e3 + 0.6458), max_relative = 1e-12);
        assert!(o.current > 0.0);
        assert!(o.capacitance > 0.0);
        assert!(o.cutoff_hz > 0.0 && o.cutoff_hz.is_finite());
        assert_eq!(s.observe(0.0).current, 0.0);
    }

    #[test]
    fn test_evaluate_shapes() {
        let s = solver(1e3);
        let input = [-1.0, -0.1, 0.0, 0.1, 1.0];
        let r = s.evaluate(&input);
        for f in Formulation::ALL {
            assert_eq!(r.output(f).len(), input.len());
        }
        assert_eq!(r.two_diode, s.process(Formulation::TwoDiode, &input));
        assert_eq!(r.cutoff_hz.len(), input.len());
    }

    #[test]
    fn test_process_into_checks_length() {
        let s = solver(1e3);
        let mut out = [0.0; 2];
        assert!(matches!(
            s.process_into(Formulation::WrightOmega, &[0.1, 0.2, 0.3], &mut out),
            Err(ClipperError::LengthMismatch { input: 3, output: 2 })
        ));
        let mut out = [0.0; 3];
        s.process_into(Formulation::WrightOmega, &[0.1, 0.2, 0.3], &mut out).unwrap();
        assert_eq!(out[1], s.solve(Formulation::WrightOmega, 0.2));
    }

    #[test]
    fn test_repeated_evaluation_is_bit_identical() {
        let s = solver(1e3);
        let input: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin() * 2.0).collect();
        for f in Formulation::ALL {
            assert_eq!(s.process(f, &input), s.process(f, &input));
        }
    }

    #[test]
    fn test_with_load_matches_fresh_coefficients() {
        let p = DiodeParams::<f64>::d1n4148();
        let c = DiodeCoefficients::new(&p, 1e3, 20.0).with_load(&p, 1e5);
        let fresh = DiodeCoefficients::new(&p, 1e5, 20.0);
        assert_eq!(c, fresh);
    }

    #[test]
    fn test_cast_to_single_precision() {
        let wide = solver(1e3);
        let narrow: DiodeSolver<f32> = wide.cast();
        let y = narrow.solve(Formulation::WrightOmega, 0.8) as f64;
        assert!((y - wide.solve(Formulation::WrightOmega, 0.8)).abs() < 1e-4);
    }
}
