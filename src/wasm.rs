//! WASM bindings for Clipper Core.
//!
//! This module provides JavaScript-friendly bindings for use in web browsers
//! with Web Audio API's AudioWorklet. Stages run in `f32`.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmDiodeStage } from 'clipper_core';
//!
//! await init();
//!
//! const clipper = new WasmDiodeStage('1N4148', 1000);
//! clipper.set_load_resistance(22000); // morphs over 480 samples
//!
//! // In AudioWorkletProcessor.process():
//! const input = inputBuffer.getChannelData(0);
//! const output = outputBuffer.getChannelData(0);
//! clipper.process_block(input, output);
//! ```

use wasm_bindgen::prelude::*;

use crate::config::{self, StageOptions};
use crate::devices::{DiodeParams, JfetParams};
use crate::error::ClipperError;
use crate::models;
use crate::solver::{Formulation, JfetSolver};
use crate::stage::{BlockProcessor, DiodeStage, JfetStage};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: ClipperError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn formulation_from_str(name: &str) -> Result<Formulation, JsValue> {
    Formulation::ALL
        .into_iter()
        .find(|f| f.name() == name)
        .ok_or_else(|| {
            js_error(ClipperError::WasmError {
                message: format!("unknown formulation '{}'", name),
            })
        })
}

/// Diode clipper stage for the browser.
#[wasm_bindgen]
pub struct WasmDiodeStage {
    stage: DiodeStage<f32>,
}

#[wasm_bindgen]
impl WasmDiodeStage {
    /// Create a clipper from a built-in diode model.
    ///
    /// # Arguments
    /// * `model` - Built-in model name, e.g. `"1N4148"`
    /// * `load_resistance` - Series resistance in ohm
    #[wasm_bindgen(constructor)]
    pub fn new(model: &str, load_resistance: f64) -> Result<WasmDiodeStage, JsValue> {
        Self::with_options(model, load_resistance, "wright-omega", false, config::DEFAULT_MORPH_SAMPLES)
    }

    /// Create a clipper with explicit stage options.
    ///
    /// # Arguments
    /// * `formulation` - One of `one-diode`, `two-diode`, `two-diode-simplified`,
    ///   `wright-omega`, `omega-approx`
    /// * `normalize` - Scale the output so 1 V in gives 1 V out
    /// * `morph_samples` - Samples over which resistance changes are spread
    #[wasm_bindgen]
    pub fn with_options(
        model: &str,
        load_resistance: f64,
        formulation: &str,
        normalize: bool,
        morph_samples: usize,
    ) -> Result<WasmDiodeStage, JsValue> {
        config::validate_diode_circuit(load_resistance, crate::DEFAULT_TEMPERATURE_C).map_err(js_error)?;
        let library = models::builtin().map_err(js_error)?;
        let card = library.require(model).map_err(js_error)?;
        let params: DiodeParams<f32> = DiodeParams::from_model(card).map_err(js_error)?;

        let options = StageOptions::new()
            .with_formulation(formulation_from_str(formulation)?)
            .with_normalize(normalize)
            .with_morph_samples(morph_samples);

        Ok(WasmDiodeStage {
            stage: DiodeStage::new(params, load_resistance, options),
        })
    }

    /// Move the load resistance to a new value.
    #[wasm_bindgen]
    pub fn set_load_resistance(&mut self, load_resistance: f64) {
        self.stage.set_load_resistance(load_resistance);
    }

    /// Process a block of audio samples.
    ///
    /// # Example (AudioWorklet)
    /// ```javascript
    /// class ClipperProcessor extends AudioWorkletProcessor {
    ///   process(inputs, outputs) {
    ///     const input = inputs[0][0];
    ///     const output = outputs[0][0];
    ///     if (input && output) {
    ///       this.clipper.process_block(input, output);
    ///     }
    ///     return true;
    ///   }
    /// }
    /// ```
    #[wasm_bindgen]
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let len = input.len().min(output.len());
        if self.stage.process_block(&input[..len], &mut output[..len]).is_err() {
            output[..len].fill(0.0);
        }
    }

    /// Process a block of audio samples, returning the result.
    #[wasm_bindgen]
    pub fn process_block_alloc(&mut self, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0; input.len()];
        self.process_block(input, &mut output);
        output
    }
}

/// Common-source JFET stage for the browser.
#[wasm_bindgen]
pub struct WasmJfetStage {
    stage: JfetStage<f32>,
}

#[wasm_bindgen]
impl WasmJfetStage {
    /// Create a stage from a built-in JFET model.
    ///
    /// # Arguments
    /// * `model` - Built-in model name, e.g. `"J201"`
    /// * `rd` - External drain resistor in ohm
    /// * `rs` - External source resistor in ohm
    /// * `vdd` - Supply voltage
    #[wasm_bindgen(constructor)]
    pub fn new(model: &str, rd: f64, rs: f64, vdd: f64) -> Result<WasmJfetStage, JsValue> {
        let library = models::builtin().map_err(js_error)?;
        let card = library.require(model).map_err(js_error)?;
        let params = JfetParams::<f64>::from_model(card, rd, rs, vdd).map_err(js_error)?;
        config::validate_jfet(&params).map_err(js_error)?;

        Ok(WasmJfetStage {
            stage: JfetStage::new(JfetSolver::new(params.cast())),
        })
    }

    /// Drain voltage at zero input.
    #[wasm_bindgen(getter)]
    pub fn quiescent_voltage(&self) -> f32 {
        self.stage.quiescent_voltage()
    }

    /// Process a block of audio samples.
    #[wasm_bindgen]
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let len = input.len().min(output.len());
        if self.stage.process_block(&input[..len], &mut output[..len]).is_err() {
            output[..len].fill(0.0);
        }
    }

    /// Process a block of audio samples, returning the result.
    #[wasm_bindgen]
    pub fn process_block_alloc(&mut self, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0; input.len()];
        self.process_block(input, &mut output);
        output
    }
}

/// Names of the built-in device models.
#[wasm_bindgen]
pub fn builtin_models() -> Vec<String> {
    models::builtin()
        .map(|lib| lib.names().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the default sample rate.
#[wasm_bindgen]
pub fn default_sample_rate() -> f32 {
    crate::DEFAULT_SAMPLE_RATE
}
