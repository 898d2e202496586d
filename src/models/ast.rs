//! Parsed model cards.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ClipperError, Result};

/// A collection of model cards keyed by upper-cased name.
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: HashMap<String, ModelDef>,
}

impl ModelLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model, rejecting duplicate names.
    pub fn insert(&mut self, model: ModelDef) -> Result<()> {
        let key = model.name.to_ascii_uppercase();
        if self.models.contains_key(&key) {
            return Err(ClipperError::DuplicateModel { name: model.name });
        }
        self.models.insert(key, model);
        Ok(())
    }

    /// Look a model up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(&name.to_ascii_uppercase())
    }

    /// Look a model up by name, failing with [`ClipperError::UnknownModel`].
    pub fn require(&self, name: &str) -> Result<&ModelDef> {
        self.get(name).ok_or_else(|| ClipperError::UnknownModel {
            name: name.to_string(),
        })
    }

    /// Merge another library into this one. Models in `other` replace
    /// same-named models here.
    pub fn extend(&mut self, other: ModelLibrary) {
        self.models.extend(other.models);
    }

    /// Model names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.values().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the library holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// A model definition.
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model name as written
    pub name: String,
    /// Device kind
    pub model_type: ModelType,
    /// Numeric parameters, keyed by lower-cased name
    pub params: HashMap<String, f64>,
    /// Source line number
    pub line: usize,
}

/// Device kinds a model card can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Junction diode
    Diode,
    /// N-channel JFET
    NJfet,
    /// P-channel JFET
    PJfet,
}

impl ModelType {
    /// Parse a model type from its SPICE keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "D" => Some(Self::Diode),
            "NJF" => Some(Self::NJfet),
            "PJF" => Some(Self::PJfet),
            _ => None,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::Diode => write!(f, "D"),
            ModelType::NJfet => write!(f, "NJF"),
            ModelType::PJfet => write!(f, "PJF"),
        }
    }
}
