//! Real-time block processors.
//!
//! Stages wrap the solvers for audio use: `f32` samples in and out, blocks of
//! any length, and for the diode stage click-free changes of the load
//! resistance. The internal precision is a type parameter, so the same
//! stage can run in `f32` for speed or `f64` as a reference.

use crate::config::{StageOptions, MAX_LOAD_RESISTANCE};
use crate::devices::DiodeParams;
use crate::error::{ClipperError, Result};
use crate::precision::Real;
use crate::solver::{DiodeCoefficients, Formulation, JfetSolver};

/// Anything that turns a block of input samples into output samples.
pub trait BlockProcessor {
    /// Process one block. `output` must be as long as `input`.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> Result<()>;

    /// Finish any pending parameter change.
    fn reset(&mut self) {}
}

/// Linear ramp of one value over a number of samples.
#[derive(Debug, Clone, Copy)]
struct Ramp<T> {
    value: T,
    target: T,
    step: T,
}

impl<T: Real> Ramp<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            target: value,
            step: T::zero(),
        }
    }

    fn retarget(&mut self, target: T, samples: usize) {
        self.target = target;
        if samples == 0 {
            self.finish();
        } else {
            self.step = (target - self.value) / T::from_wide(samples as f64);
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.value = self.value + self.step;
    }

    fn finish(&mut self) {
        self.value = self.target;
        self.step = T::zero();
    }
}

/// Diode clipper stage with a variable load resistance.
///
/// Changing the load resistance moves `a0` and the make-up gain linearly to
/// their new values over `morph_samples` samples. While moving, `ln(a0 a1)`
/// is recomputed from `a0`, which keeps it finite when either end of the
/// morph has zero total resistance.
#[derive(Debug, Clone)]
pub struct DiodeStage<T> {
    params: DiodeParams<T>,
    options: StageOptions,
    coefficients: DiodeCoefficients<T>,
    load_resistance: T,
    a0: Ramp<T>,
    gain: Ramp<T>,
    remaining: usize,
}

impl<T: Real> DiodeStage<T> {
    /// Create a stage at the given load resistance (ohm).
    pub fn new(params: DiodeParams<T>, load_resistance: f64, options: StageOptions) -> Self {
        let load = Self::clip_load(load_resistance);
        let coefficients =
            DiodeCoefficients::new(&params, load, T::from_wide(options.temperature_c));
        let mut stage = Self {
            params,
            options,
            coefficients,
            load_resistance: load,
            a0: Ramp::new(coefficients.a0),
            gain: Ramp::new(T::one()),
            remaining: 0,
        };
        stage.gain = Ramp::new(stage.makeup_gain(&coefficients));
        stage
    }

    fn clip_load(load_resistance: f64) -> T {
        if load_resistance.is_nan() {
            log::warn!("diode stage: NaN load resistance, using 0");
            return T::zero();
        }
        let clipped = load_resistance.clamp(0.0, MAX_LOAD_RESISTANCE);
        if clipped != load_resistance {
            log::warn!("diode stage: load resistance {} clipped to {}", load_resistance, clipped);
        }
        T::from_wide(clipped)
    }

    fn makeup_gain(&self, coefficients: &DiodeCoefficients<T>) -> T {
        if self.options.normalize {
            T::one() / coefficients.solve(self.options.formulation, T::one())
        } else {
            T::one()
        }
    }

    /// Load resistance the stage is at, or moving towards.
    pub fn load_resistance(&self) -> T {
        self.load_resistance
    }

    /// Stage options.
    pub fn options(&self) -> &StageOptions {
        &self.options
    }

    /// Whether a load-resistance change is still in progress.
    pub fn is_morphing(&self) -> bool {
        self.remaining > 0
    }

    /// Change the load resistance. Values are clipped to `[0, 1e7]` ohm.
    pub fn set_load_resistance(&mut self, load_resistance: f64) {
        let load = Self::clip_load(load_resistance);
        let target = self.coefficients.with_load(&self.params, load);
        let gain = self.makeup_gain(&target);
        let samples = self.options.morph_samples;

        self.a0.retarget(target.a0, samples);
        self.gain.retarget(gain, samples);
        self.coefficients = target;
        self.load_resistance = load;
        self.remaining = samples;
    }

    /// Process one sample.
    #[inline]
    pub fn tick(&mut self, x: T) -> T {
        if self.remaining > 0 {
            self.a0.advance();
            self.gain.advance();
            self.remaining -= 1;
            if self.remaining == 0 {
                self.reset();
            } else {
                let a0 = self.a0.value;
                let coefficients = DiodeCoefficients {
                    a0,
                    log_a0a1: (a0 * self.coefficients.a1).ln(),
                    ..self.coefficients
                };
                return coefficients.solve(self.options.formulation, x) * self.gain.value;
            }
        }
        self.coefficients.solve(self.options.formulation, x) * self.gain.value
    }
}

impl<T: Real> BlockProcessor for DiodeStage<T> {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        ClipperError::check_lengths(input.len(), output.len())?;
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.tick(T::from_wide(f64::from(x))).to_wide() as f32;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.a0.finish();
        self.gain.finish();
        self.remaining = 0;
    }
}

/// Common-source JFET stage producing the drain voltage swing.
///
/// The output is the drain voltage minus its value at zero input, so
/// silence maps to silence. The stage inverts.
#[derive(Debug, Clone)]
pub struct JfetStage<T> {
    solver: JfetSolver<T>,
    quiescent: T,
}

impl<T: Real> JfetStage<T> {
    /// Create a stage around a solver.
    pub fn new(solver: JfetSolver<T>) -> Self {
        let quiescent = solver.solve(T::zero()).output_voltage;
        log::debug!("jfet stage: quiescent drain voltage {}", quiescent);
        Self { solver, quiescent }
    }

    /// Drain voltage at zero input.
    pub fn quiescent_voltage(&self) -> T {
        self.quiescent
    }

    /// The wrapped solver.
    pub fn solver(&self) -> &JfetSolver<T> {
        &self.solver
    }

    /// Process one sample.
    #[inline]
    pub fn tick(&self, x: T) -> T {
        self.solver.solve(x).output_voltage - self.quiescent
    }
}

impl<T: Real> BlockProcessor for JfetStage<T> {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        ClipperError::check_lengths(input.len(), output.len())?;
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.tick(T::from_wide(f64::from(x))).to_wide() as f32;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::JfetParams;
    use approx::assert_relative_eq;

    fn diode_stage(options: StageOptions) -> DiodeStage<f64> {
        DiodeStage::new(DiodeParams::d1n4148(), 1e3, options)
    }

    #[test]
    fn test_diode_stage_matches_solver() {
        let mut stage = diode_stage(StageOptions::new());
        let solver = crate::solver::DiodeSolver::new(DiodeParams::<f64>::d1n4148(), 1e3, 20.0);
        let input = [-1.0f32, -0.2, 0.0, 0.3, 0.9];
        let mut output = [0.0f32; 5];
        stage.process_block(&input, &mut output).unwrap();
        for (&x, &y) in input.iter().zip(&output) {
            let expected = solver.solve(Formulation::WrightOmega, x as f64) as f32;
            assert_eq!(y, expected);
        }
    }

    #[test]
    fn test_normalize_maps_one_volt_to_one() {
        for f in [Formulation::WrightOmega, Formulation::OmegaApprox] {
            let mut stage = diode_stage(StageOptions::new().with_formulation(f).with_normalize(true));
            assert_relative_eq!(stage.tick(1.0), 1.0, max_relative = 1e-12);
            assert_relative_eq!(stage.tick(-1.0), -1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_morph_reaches_target_after_morph_samples() {
        let mut stage = diode_stage(StageOptions::new().with_morph_samples(100));
        let start = stage.tick(1.0);
        stage.set_load_resistance(1e5);
        assert!(stage.is_morphing());

        let mut previous = start;
        for _ in 0..99 {
            let y = stage.tick(1.0);
            // Larger resistance, lower clipping level, reached gradually
            assert!(y < previous);
            previous = y;
        }
        assert!(stage.is_morphing());
        let last = stage.tick(1.0);
        assert!(!stage.is_morphing());

        let target = DiodeStage::<f64>::new(DiodeParams::d1n4148(), 1e5, StageOptions::new()).tick(1.0);
        assert_eq!(last, target);
        assert_eq!(stage.load_resistance(), 1e5);
    }

    #[test]
    fn test_morph_from_zero_total_resistance_stays_finite() {
        // No RS on the card and no load: a0 = 0, ln(a0 a1) = -inf
        let params = DiodeParams::new(2e-7, 1.3, 0.0, 0.0, 1.0, 0.5, 0.0);
        for f in Formulation::ALL {
            let options = StageOptions::new().with_formulation(f).with_morph_samples(4);
            let mut stage = DiodeStage::<f64>::new(params, 0.0, options);
            // Only the two-diode leakage term moves the output off the input
            assert_relative_eq!(stage.tick(0.5), 0.5, epsilon = 1e-6);

            stage.set_load_resistance(1e3);
            let up: Vec<f64> = (0..5).map(|_| stage.tick(0.5)).collect();
            assert!(up.iter().all(|y| y.is_finite()), "{}: {:?}", f, up);
            let target = DiodeStage::<f64>::new(params, 1e3, options).tick(0.5);
            assert_eq!(up[4], target);

            stage.set_load_resistance(0.0);
            let down: Vec<f64> = (0..5).map(|_| stage.tick(0.5)).collect();
            assert!(down.iter().all(|y| y.is_finite()), "{}: {:?}", f, down);
            assert_relative_eq!(down[4], 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_morph_applies_immediately() {
        let mut stage = diode_stage(StageOptions::new().with_morph_samples(0));
        stage.set_load_resistance(1e4);
        assert!(!stage.is_morphing());
        let target = DiodeStage::<f64>::new(DiodeParams::d1n4148(), 1e4, StageOptions::new()).tick(0.7);
        assert_eq!(stage.tick(0.7), target);
    }

    #[test]
    fn test_reset_finishes_morph() {
        let mut stage = diode_stage(StageOptions::new());
        stage.set_load_resistance(1e4);
        stage.reset();
        assert!(!stage.is_morphing());
        let target = DiodeStage::<f64>::new(DiodeParams::d1n4148(), 1e4, StageOptions::new()).tick(0.5);
        assert_eq!(stage.tick(0.5), target);
    }

    #[test]
    fn test_load_resistance_is_clipped() {
        let mut stage = diode_stage(StageOptions::new().with_morph_samples(0));
        stage.set_load_resistance(-5.0);
        assert_eq!(stage.load_resistance(), 0.0);
        stage.set_load_resistance(1e9);
        assert_eq!(stage.load_resistance(), MAX_LOAD_RESISTANCE);
    }

    #[test]
    fn test_jfet_stage_silence_in_silence_out() {
        let params = JfetParams::new(1.304e-3, 2.8e-3, -0.8, 4.4e3, 1e3, 9.0).with_device_resistances(1.0, 1.0);
        let mut stage = JfetStage::new(JfetSolver::<f32>::new(params.cast()));
        let input = [0.0f32, 0.5, -0.5];
        let mut output = [1.0f32; 3];
        stage.process_block(&input, &mut output).unwrap();
        assert_eq!(output[0], 0.0);
        // Inverting: positive input pulls the drain down
        assert!(output[1] < 0.0);
        assert!(output[2] > 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let mut stage = diode_stage(StageOptions::new());
        let mut output = [0.0f32; 1];
        assert!(stage.process_block(&[0.0, 0.1], &mut output).is_err());
    }

    #[test]
    fn test_block_processor_is_object_safe() {
        let mut stages: Vec<Box<dyn BlockProcessor>> = vec![
            Box::new(DiodeStage::<f32>::new(DiodeParams::d1n4148(), 1e3, StageOptions::new())),
            Box::new(JfetStage::new(JfetSolver::new(JfetParams::<f64>::new(
                1.304e-3, 2.8e-3, -0.8, 4.4e3, 1e3, 9.0,
            )))),
        ];
        let mut out = [0.0f32; 2];
        for s in stages.iter_mut() {
            s.process_block(&[0.1, -0.1], &mut out).unwrap();
            assert!(out.iter().all(|v| v.is_finite()));
        }
    }
}
