//! SPICE `.model` card parser.
//!
//! Device parameters usually come from vendor model libraries. This module
//! reads the subset of SPICE syntax those libraries use for diode and JFET
//! models and collects the cards into a [`ModelLibrary`].
//!
//! # Grammar Overview
//!
//! ```text
//! library     = { line }
//! line        = comment | model | empty
//! comment     = '*' { any_char }            (first column only)
//!             | (';' | '#') { any_char }
//! model       = ".model" name type ['('] { param '=' value } [')']
//! continuation = '+' at the start of a line joins it to the previous one
//!
//! type        = "D" | "NJF" | "PJF"
//! value       = number [scale] [unit]
//! scale       = 'f' | 'p' | 'n' | 'u' | 'm' | "meg" | 'k' | 'g' | 't'
//! ```
//!
//! Names, parameters and scale suffixes are case-insensitive, as in SPICE,
//! so `M` means milli and `MEG` means mega.
//!
//! # Example
//!
//! ```text
//! * Small-signal diode
//! .model 1N4148 D(IS=4.352n N=1.906 RS=0.6458 CJO=0.7048p
//! +               VJ=0.869 M=0.03 TT=3.48n)
//! ```

mod ast;
mod lexer;
mod library;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use library::BUILTIN_MODELS;
pub use parser::Parser;

use crate::error::Result;

/// Parse model cards from a string.
pub fn parse(input: &str) -> Result<ModelLibrary> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse a model library file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<ModelLibrary> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::ClipperError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

/// The model cards shipped with the crate.
pub fn builtin() -> Result<ModelLibrary> {
    parse(BUILTIN_MODELS)
}
