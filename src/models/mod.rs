//! Reference model adapters
//!
//! Fixed-coefficient scorers that implement [`Model`](crate::model::Model).
//! They are loaded from JSON and never fitted here.

mod linear;

pub use linear::{LinearModel, LogisticModel};

use crate::error::Result;
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized model description, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    Linear(LinearModel),
    Logistic(LogisticModel),
}

impl ModelSpec {
    /// Read a model description from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Number of features the model expects
    pub fn n_features(&self) -> usize {
        match self {
            ModelSpec::Linear(m) => m.weights.len(),
            ModelSpec::Logistic(m) => m.weights.len(),
        }
    }

    /// Turn the description into a boxed model
    pub fn into_model(self) -> Box<dyn Model> {
        match self {
            ModelSpec::Linear(m) => Box::new(m),
            ModelSpec::Logistic(m) => Box::new(m),
        }
    }
}
