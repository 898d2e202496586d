//! Error types for the clipper solvers.
//!
//! The numeric solvers themselves never fail: out-of-domain parameters give
//! unphysical numbers and samples without a valid JFET operating region
//! fall back to zero current. [`ClipperError`] covers what can go wrong at
//! the edges of the crate: reading SPICE model cards, looking models up,
//! validating user-supplied circuit values and moving audio in and out.

use thiserror::Error;

/// Result type alias using [`ClipperError`].
pub type Result<T> = std::result::Result<T, ClipperError>;

/// Unified error type for all clipper operations.
#[derive(Error, Debug)]
pub enum ClipperError {
    // ============ Model Card Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Duplicate model name
    #[error("Duplicate model name '{name}'")]
    DuplicateModel { name: String },

    // ============ Model Lookup Errors ============
    /// Model not present in the library
    #[error("Unknown model '{name}'")]
    UnknownModel { name: String },

    /// Model exists but describes a different kind of device
    #[error("Model '{model}' is a {found} model, expected {expected}")]
    ModelTypeMismatch {
        model: String,
        expected: String,
        found: String,
    },

    /// Model kind the solvers cannot evaluate
    #[error("Unsupported model '{model}': {message}")]
    UnsupportedModel { model: String, message: String },

    // ============ Configuration Errors ============
    /// Invalid circuit or stage parameter
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // ============ Processing Errors ============
    /// Output buffer does not match the input length
    #[error("Buffer length mismatch: input has {input} samples, output has {output}")]
    LengthMismatch { input: usize, output: usize },

    // ============ I/O Errors ============
    /// Error reading a model library file
    #[error("Failed to read model file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error reading audio input
    #[error("Audio input error: {message}")]
    AudioInputError { message: String },

    /// Error writing audio output
    #[error("Audio output error: {message}")]
    AudioOutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl ClipperError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Check that an output buffer can hold one result per input sample.
    pub fn check_lengths(input: usize, output: usize) -> Result<()> {
        if input == output {
            Ok(())
        } else {
            Err(Self::LengthMismatch { input, output })
        }
    }
}
