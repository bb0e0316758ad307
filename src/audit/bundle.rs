//! Versioned explanation bundle

use crate::error::{ExplainError, Result};
use crate::explainability::FeatureScores;
use crate::reason_codes::ReasonCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Model identification recorded in the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub task: String,
    pub framework: String,
    pub artifact_schema_version: String,
}

/// Shape and missingness of the explained dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub n_rows: usize,
    pub n_cols: usize,
    /// Feature name -> NaN count
    pub missing_by_feature: IndexMap<String, usize>,
}

/// Global explanation block (top-k)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalExplanations {
    #[serde(with = "crate::serde_float::scores")]
    pub permutation_importance: FeatureScores,
}

/// Local explanation block for the explained sample (top-k)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExplanations {
    pub sample_index: usize,
    #[serde(with = "crate::serde_float::scores")]
    pub what_if_contributions: FeatureScores,
}

/// Drift block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Feature name -> PSI
    #[serde(with = "crate::serde_float::scores")]
    pub psi: FeatureScores,
    pub bins: usize,
}

/// Audit bundle produced by one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationBundle {
    pub schema_version: String,
    pub model: ModelMetadata,
    pub data_summary: DataSummary,
    pub global_explanations: GlobalExplanations,
    pub local_explanations: LocalExplanations,
    pub reason_codes: Vec<ReasonCode>,
    #[serde(default)]
    pub stability: Option<StabilityReport>,
    #[serde(default)]
    pub model_card_markdown: Option<String>,
}

impl ExplanationBundle {
    /// Bundle as a JSON value tree
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a bundle from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the bundle as JSON, creating parent directories
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        std::fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "Wrote explanation bundle");
        Ok(())
    }

    /// Write the model card markdown, creating parent directories
    ///
    /// Fails when the bundle carries no model card.
    pub fn save_model_card(&self, path: impl AsRef<Path>) -> Result<()> {
        let markdown = match self.model_card_markdown.as_deref() {
            Some(md) if !md.trim().is_empty() => md,
            _ => {
                return Err(ExplainError::MissingArtifact(
                    "model_card_markdown is empty; generate it via the pipeline first".to_string(),
                ))
            }
        };
        let path = path.as_ref();
        ensure_parent(path)?;
        std::fs::write(path, markdown)?;
        info!(path = %path.display(), "Wrote model card");
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
