//! Offline accuracy checks.
//!
//! Test signals, error metrics and the two reports used to choose a
//! formulation and a float width: how far each diode formulation is from the
//! exact two-diode solution, and how much `f32` evaluation diverges from
//! `f64` for both solvers.

use std::fmt;

use crate::devices::{DiodeParams, JfetParams};
use crate::precision::Real;
use crate::solver::{DiodeConfig, DiodeSolver, Formulation, JfetConfig, JfetSolver};

/// Load resistances swept by default, ohm.
pub const DEFAULT_RESISTANCES: [f64; 7] = [0.0, 1.0, 10.0, 1e3, 1e4, 1e5, 1e6];

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Triangle wave through `(0, 0)`, `(T/4, A)`, `(3T/4, -A)`, `(T, 0)`.
pub fn triangle(amplitude: f64, period_s: f64, duration_s: f64, sample_rate: f64) -> Vec<f64> {
    let n = (duration_s * sample_rate).round() as usize;
    (0..n)
        .map(|i| {
            let phase = (i as f64 / sample_rate / period_s).fract();
            let shape = if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            };
            amplitude * shape
        })
        .collect()
}

/// Sine wave starting at phase zero.
pub fn sine(amplitude: f64, frequency_hz: f64, duration_s: f64, sample_rate: f64) -> Vec<f64> {
    let n = (duration_s * sample_rate).round() as usize;
    (0..n)
        .map(|i| amplitude * (std::f64::consts::TAU * frequency_hz * i as f64 / sample_rate).sin())
        .collect()
}

/// Largest absolute difference between two equally long signals, possibly
/// at different precisions. A non-finite difference counts as infinite.
pub fn max_abs_diff<A: Real, B: Real>(a: &[A], b: &[B]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = (x.to_wide() - y.to_wide()).abs();
            if d.is_nan() {
                f64::INFINITY
            } else {
                d
            }
        })
        .fold(0.0, f64::max)
}

/// Amplitude ratio in decibels.
pub fn to_db(ratio: f64) -> f64 {
    20.0 * ratio.log10()
}

/// Accuracy of one diode formulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulationAccuracy {
    pub formulation: Formulation,
    /// Largest deviation from the `f64` two-diode solution, V
    pub max_error: f64,
    /// Largest `f32` vs `f64` deviation of this formulation, V
    pub precision_divergence: f64,
}

/// Diode formulations compared across load resistances.
#[derive(Debug, Clone, PartialEq)]
pub struct DiodeReport {
    pub rows: Vec<FormulationAccuracy>,
    /// Lowest cutoff estimate over all resistances and samples, Hz
    pub min_cutoff_hz: f64,
    /// Peak input amplitude the errors are relative to, V
    pub amplitude: f64,
}

impl DiodeReport {
    /// Row for one formulation.
    pub fn accuracy(&self, formulation: Formulation) -> Option<&FormulationAccuracy> {
        self.rows.iter().find(|r| r.formulation == formulation)
    }
}

/// Compare every diode formulation against the exact two-diode solution.
pub fn diode_report(
    params: &DiodeParams<f64>,
    resistances: &[f64],
    input: &[f64],
    temperature_c: f64,
) -> DiodeReport {
    let narrow_input: Vec<f32> = crate::precision::cast_slice(input);
    let mut rows: Vec<FormulationAccuracy> = Formulation::ALL
        .iter()
        .map(|&formulation| FormulationAccuracy {
            formulation,
            max_error: 0.0,
            precision_divergence: 0.0,
        })
        .collect();
    let mut min_cutoff_hz = f64::INFINITY;

    for &r in resistances {
        let config = DiodeConfig::new().with_load_resistance(r).with_temperature(temperature_c);
        let wide = DiodeSolver::with_config(*params, config);
        let narrow: DiodeSolver<f32> = wide.cast();
        let response = wide.evaluate(input);

        for row in rows.iter_mut() {
            let out = response.output(row.formulation);
            row.max_error = row.max_error.max(max_abs_diff(out, &response.two_diode));
            let narrow_out = narrow.process(row.formulation, &narrow_input);
            row.precision_divergence = row.precision_divergence.max(max_abs_diff(out, &narrow_out));
        }
        min_cutoff_hz = response.cutoff_hz.iter().copied().fold(min_cutoff_hz, f64::min);
    }

    log::info!(
        "diode report: {} resistances x {} samples",
        resistances.len(),
        input.len()
    );

    DiodeReport {
        rows,
        min_cutoff_hz,
        amplitude: input.iter().fold(0.0, |m: f64, v| m.max(v.abs())),
    }
}

impl fmt::Display for DiodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = if self.amplitude > 0.0 { self.amplitude } else { 1.0 };
        writeln!(f, "{:<22} {:>14} {:>14}", "formulation", "vs two-diode", "f32 vs f64")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<22} {:>11.1} dB {:>11.1} dB",
                row.formulation.name(),
                to_db(row.max_error / reference),
                to_db(row.precision_divergence / reference)
            )?;
        }
        write!(f, "minimum cutoff estimate: {:.1} Hz", self.min_cutoff_hz)
    }
}

/// Behaviour of the JFET solver over one input signal.
#[derive(Debug, Clone, PartialEq)]
pub struct JfetReport {
    /// Largest `f32` vs `f64` drain-current deviation, A
    pub precision_divergence: f64,
    /// Largest drain-current change between neighbouring samples, A
    pub max_step: f64,
    /// Peak drain current, A
    pub peak_current: f64,
    /// Samples where no region was valid
    pub fallback_samples: usize,
    /// Operating-point changes along the signal
    pub region_switches: usize,
}

/// Evaluate the JFET stage in both precisions over `input`.
pub fn jfet_report(params: &JfetParams<f64>, config: JfetConfig, input: &[f64]) -> JfetReport {
    let wide = JfetSolver::with_config(*params, config);
    let narrow: JfetSolver<f32> = wide.cast();
    let narrow_input: Vec<f32> = crate::precision::cast_slice(input);

    let response = wide.process(input);
    let narrow_response = narrow.process(&narrow_input);

    let max_step = response
        .drain_current
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max);

    JfetReport {
        precision_divergence: max_abs_diff(&response.drain_current, &narrow_response.drain_current),
        max_step,
        peak_current: response.drain_current.iter().copied().fold(0.0, f64::max),
        fallback_samples: response.fallback_count(),
        region_switches: response.region_switches(),
    }
}

impl fmt::Display for JfetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = if self.peak_current > 0.0 { self.peak_current } else { 1.0 };
        writeln!(f, "peak drain current:     {:.4e} A", self.peak_current)?;
        writeln!(
            f,
            "f32 vs f64:             {:.4e} A ({:.1} dB)",
            self.precision_divergence,
            to_db(self.precision_divergence / reference)
        )?;
        writeln!(f, "largest sample step:    {:.4e} A", self.max_step)?;
        writeln!(f, "zero-current fallbacks: {}", self.fallback_samples)?;
        write!(f, "region switches:        {}", self.region_switches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_triangle_breakpoints() {
        // 8 samples per period
        let t = triangle(1.0, 1.0, 1.0, 8.0);
        assert_eq!(t, vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5]);
    }

    #[test]
    fn test_sine_length_and_peak() {
        let s = sine(1.3, 20.0, 0.1, 48_000.0);
        assert_eq!(s.len(), 4800);
        assert_eq!(s[0], 0.0);
        assert_relative_eq!(s[600], 1.3, max_relative = 1e-12);
    }

    #[test]
    fn test_max_abs_diff_mixed_precision() {
        let a = [1.0f64, 2.0, 3.0];
        let b = [1.0f32, 2.5, 2.0];
        assert_eq!(max_abs_diff(&a, &b), 1.0);
        assert_eq!(max_abs_diff(&[f64::NAN], &[0.0f64]), f64::INFINITY);
        assert_eq!(max_abs_diff::<f64, f64>(&[], &[]), 0.0);
    }

    #[test]
    fn test_to_db() {
        assert_relative_eq!(to_db(0.1), -20.0);
        assert_relative_eq!(to_db(1e-4), -80.0);
    }

    #[test]
    fn test_diode_report_reference_row_is_zero() {
        let report = diode_report(&DiodeParams::d1n4148(), &[1e3, 1e4], &linspace(-1.0, 1.0, 201), 20.0);
        assert_eq!(report.accuracy(Formulation::TwoDiode).unwrap().max_error, 0.0);
        assert!(report.accuracy(Formulation::WrightOmega).unwrap().max_error < 1e-7);
        assert!(report.min_cutoff_hz > 0.0);
        assert_relative_eq!(report.amplitude, 1.0);
        let text = report.to_string();
        assert!(text.contains("omega-approx"));
    }

    #[test]
    fn test_jfet_report_counts() {
        let params = JfetParams::new(1.304e-3, 2.8e-3, -0.8, 20e3, 1e3, 9.0).with_device_resistances(1.0, 1.0);
        let report = jfet_report(&params, JfetConfig::default(), &linspace(-3.0, 3.0, 601));
        assert_eq!(report.region_switches, 2);
        assert!(report.fallback_samples > 200);
        assert!(report.max_step < 2e-5);
        assert!(report.to_string().contains("region switches"));
    }
}
