//! Common-source JFET stage.
//!
//! Per sample, each operating region gives two closed-form drain currents
//! from the square-law model without channel-length modulation. Candidates
//! are checked against their region's validity condition, refined with a
//! fixed number of Newton steps on the region cubic (which restores the
//! `(1 + LAMBDA Vds)` term), and clamped to be non-negative.
//!
//! When both regions produce a valid candidate the saturation one is used.
//! When neither does, the current is zero.

use crate::devices::{JfetParams, RegionPolynomials};
use crate::error::{ClipperError, Result};
use crate::precision::Real;

use super::region::{first_valid, Branch};
use super::{NewtonRaphson, DEFAULT_NEWTON_STEPS};

/// Solver options for the JFET stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfetConfig {
    /// Refine candidates with Newton steps on the cubic that includes
    /// channel-length modulation
    pub channel_length_modulation: bool,
    /// Newton steps per candidate
    pub newton_steps: usize,
}

impl Default for JfetConfig {
    fn default() -> Self {
        Self {
            channel_length_modulation: true,
            newton_steps: DEFAULT_NEWTON_STEPS,
        }
    }
}

impl JfetConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the channel-length modulation refinement.
    pub fn with_channel_length_modulation(mut self, enabled: bool) -> Self {
        self.channel_length_modulation = enabled;
        self
    }

    /// Set the number of Newton steps per candidate.
    pub fn with_newton_steps(mut self, steps: usize) -> Self {
        self.newton_steps = steps;
        self
    }
}

/// JFET operating region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Triode,
    Saturation,
}

/// Region and root a selected current came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatingPoint {
    pub region: Region,
    pub branch: Branch,
}

/// All drain-current candidates for one input sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCandidates<T> {
    /// Gate overdrive `Vin - VTO`
    pub vgt: T,
    /// Triode roots of the square-law quadratic
    pub triode: [T; 2],
    /// Saturation roots of the square-law quadratic
    pub saturation: [T; 2],
    /// Triode roots after refinement and clamping
    pub triode_refined: [T; 2],
    /// Saturation roots after refinement and clamping
    pub saturation_refined: [T; 2],
    /// First triode root satisfying the triode condition
    pub triode_branch: Option<Branch>,
    /// First saturation root satisfying the saturation condition
    pub saturation_branch: Option<Branch>,
}

impl<T: Real> RegionCandidates<T> {
    /// Selected drain current and where it came from.
    ///
    /// Saturation takes precedence over triode; `None` means no candidate
    /// was valid.
    pub fn select(&self) -> Option<(T, OperatingPoint)> {
        if let Some(branch) = self.saturation_branch {
            let point = OperatingPoint {
                region: Region::Saturation,
                branch,
            };
            return Some((branch.pick(&self.saturation_refined), point));
        }
        self.triode_branch.map(|branch| {
            let point = OperatingPoint {
                region: Region::Triode,
                branch,
            };
            (branch.pick(&self.triode_refined), point)
        })
    }
}

/// Solution for one input sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JfetSample<T> {
    /// Drain current, A
    pub drain_current: T,
    /// Drain voltage, V
    pub output_voltage: T,
    /// `None` when no candidate was valid and the current fell back to zero
    pub operating_point: Option<OperatingPoint>,
}

/// Solutions for a batch of input samples.
#[derive(Debug, Clone, PartialEq)]
pub struct JfetResponse<T> {
    pub drain_current: Vec<T>,
    pub output_voltage: Vec<T>,
    pub operating_points: Vec<Option<OperatingPoint>>,
}

impl<T> JfetResponse<T> {
    fn with_capacity(n: usize) -> Self {
        Self {
            drain_current: Vec::with_capacity(n),
            output_voltage: Vec::with_capacity(n),
            operating_points: Vec::with_capacity(n),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.drain_current.len()
    }

    /// Whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.drain_current.is_empty()
    }

    /// Samples where no region was valid.
    pub fn fallback_count(&self) -> usize {
        self.operating_points.iter().filter(|p| p.is_none()).count()
    }

    /// Number of times the operating point changes between neighbours.
    pub fn region_switches(&self) -> usize {
        self.operating_points.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

/// JFET stage solver for one parameter set.
#[derive(Debug, Clone)]
pub struct JfetSolver<T> {
    params: JfetParams<T>,
    config: JfetConfig,
    polynomials: RegionPolynomials<T>,
    newton: NewtonRaphson,
}

impl<T: Real> JfetSolver<T> {
    /// Create a solver with default configuration.
    pub fn new(params: JfetParams<T>) -> Self {
        Self::with_config(params, JfetConfig::default())
    }

    /// Create a solver with custom configuration.
    pub fn with_config(params: JfetParams<T>, config: JfetConfig) -> Self {
        let polynomials = params.polynomials();
        log::debug!(
            "jfet solver: beta={} lambda={} vto={} RD={} RS={} vdd={} clm={} steps={}",
            params.beta,
            params.lambda,
            params.vto,
            params.rd_total(),
            params.rs_total(),
            params.vdd,
            config.channel_length_modulation,
            config.newton_steps
        );
        Self {
            params,
            config,
            polynomials,
            newton: NewtonRaphson::with_steps(config.newton_steps),
        }
    }

    /// Stage parameters.
    pub fn params(&self) -> &JfetParams<T> {
        &self.params
    }

    /// Solver options.
    pub fn config(&self) -> &JfetConfig {
        &self.config
    }

    /// Region polynomials derived at construction.
    pub fn polynomials(&self) -> &RegionPolynomials<T> {
        &self.polynomials
    }

    /// Square-law roots of both regions, their refinements and validity.
    pub fn candidates(&self, vin: T) -> RegionCandidates<T> {
        let p = &self.params;
        let c = |v: f64| T::from_wide(v);
        let half = c(0.5);

        let beta = p.beta;
        let vdd = p.vdd;
        let rs = p.rs_total();
        let rds = p.rds_total();
        let vgt = vin - p.vto;

        // Triode
        let b_rds = beta * rds;
        let b_rs = beta * rs;
        let delta = c(4.0) * b_rds * b_rds * vgt * vgt - c(8.0) * b_rds * b_rs * vdd * vgt
            + c(4.0) * b_rs * b_rs * vdd * vdd
            - c(4.0) * b_rds * vdd
            + c(4.0) * b_rds * vgt
            + c(4.0) * b_rs * vdd
            + T::one();
        let root = delta.sqrt() * half;
        let numerator = b_rds * vdd - b_rds * vgt - b_rs * vdd - half;
        let denominator = b_rds * (rds - c(2.0) * rs);
        let triode = [(numerator - root) / denominator, (numerator + root) / denominator];

        // Saturation
        let root = (c(4.0) * b_rs * vgt + T::one()).sqrt();
        let numerator = c(2.0) * b_rs * vgt + T::one();
        let denominator = c(2.0) * b_rs * rs;
        let saturation = [(numerator - root) / denominator, (numerator + root) / denominator];

        let overdrive = |id: T| vgt - id * rs;
        let vds = |id: T| vdd - id * rds;
        let triode_branch = first_valid(&triode, |id| {
            let vgst = overdrive(id);
            vds(id) <= vgst && vgst > T::zero()
        });
        let saturation_branch = first_valid(&saturation, |id| {
            let vgst = overdrive(id);
            vds(id) >= vgst && vgst > T::zero()
        });

        let polys = &self.polynomials;
        let (triode_refined, saturation_refined) = if self.config.channel_length_modulation {
            (
                triode.map(|id| self.newton.refine(&polys.triode, &polys.triode_derivative, vgt, id)),
                saturation.map(|id| {
                    self.newton
                        .refine(&polys.saturation, &polys.saturation_derivative, vgt, id)
                }),
            )
        } else {
            (triode, saturation)
        };

        RegionCandidates {
            vgt,
            triode,
            saturation,
            triode_refined: triode_refined.map(|id| id.max(T::zero())),
            saturation_refined: saturation_refined.map(|id| id.max(T::zero())),
            triode_branch,
            saturation_branch,
        }
    }

    /// Drain current and voltage for one input sample.
    pub fn solve(&self, vin: T) -> JfetSample<T> {
        let (drain_current, operating_point) = match self.candidates(vin).select() {
            Some((id, point)) => (id, Some(point)),
            None => (T::zero(), None),
        };
        JfetSample {
            drain_current,
            output_voltage: self.params.vdd - drain_current * self.params.rd,
            operating_point,
        }
    }

    /// Solve a batch of input samples.
    pub fn process(&self, input: &[T]) -> JfetResponse<T> {
        let mut response = JfetResponse::with_capacity(input.len());
        for &vin in input {
            let sample = self.solve(vin);
            response.drain_current.push(sample.drain_current);
            response.output_voltage.push(sample.output_voltage);
            response.operating_points.push(sample.operating_point);
        }
        log::trace!(
            "jfet block: {} samples, {} without a valid region",
            response.len(),
            response.fallback_count()
        );
        response
    }

    /// Write drain currents and voltages into buffers the length of `input`.
    pub fn process_into(&self, input: &[T], drain_current: &mut [T], output_voltage: &mut [T]) -> Result<()> {
        ClipperError::check_lengths(input.len(), drain_current.len())?;
        ClipperError::check_lengths(input.len(), output_voltage.len())?;
        for ((&vin, id), vout) in input.iter().zip(drain_current.iter_mut()).zip(output_voltage.iter_mut()) {
            let sample = self.solve(vin);
            *id = sample.drain_current;
            *vout = sample.output_voltage;
        }
        Ok(())
    }

    /// Same solver at another precision.
    pub fn cast<U: Real>(&self) -> JfetSolver<U> {
        JfetSolver::with_config(self.params.cast(), self.config)
    }
}
