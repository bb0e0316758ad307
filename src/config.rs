//! Explanation configuration

use crate::error::{ExplainError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Type of ML task being explained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Classification (labels are numeric class ids)
    Classification,
    /// Regression
    Regression,
}

impl TaskType {
    /// Parse a task name as used on the command line
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classification" => Ok(TaskType::Classification),
            "regression" => Ok(TaskType::Regression),
            other => Err(ExplainError::InvalidParameter {
                name: "task".to_string(),
                value: other.to_string(),
                reason: "expected classification or regression".to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Classification => "classification",
            TaskType::Regression => "regression",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for explanation generation and audit artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Number of top features kept for global and local explanations
    pub top_k: usize,

    /// Permutation repeats (higher is more stable and slower)
    pub n_repeats: usize,

    /// Seed for permutation resampling
    pub random_state: u64,

    /// Task kind
    pub task: TaskType,

    /// Number of quantile bins for PSI
    pub psi_bins: usize,

    /// Schema version stamped on the bundle
    pub artifact_version: String,

    /// Human-readable model name
    pub model_name: Option<String>,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            n_repeats: 5,
            random_state: 42,
            task: TaskType::Classification,
            psi_bins: 10,
            artifact_version: "1.0".to_string(),
            model_name: None,
        }
    }
}

impl ExplainConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder method to set the number of surfaced features
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builder method to set permutation repeats
    pub fn with_n_repeats(mut self, n_repeats: usize) -> Self {
        self.n_repeats = n_repeats;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the task kind
    pub fn with_task(mut self, task: TaskType) -> Self {
        self.task = task;
        self
    }

    /// Builder method to set PSI bin count
    pub fn with_psi_bins(mut self, bins: usize) -> Self {
        self.psi_bins = bins;
        self
    }

    /// Builder method to set the artifact schema version
    pub fn with_artifact_version(mut self, version: impl Into<String>) -> Self {
        self.artifact_version = version.into();
        self
    }

    /// Builder method to set the model name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Check that every count parameter is usable
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("top_k", self.top_k),
            ("n_repeats", self.n_repeats),
            ("psi_bins", self.psi_bins),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ExplainError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if self.artifact_version.trim().is_empty() {
            return Err(ExplainError::InvalidParameter {
                name: "artifact_version".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExplainConfig::default();
        assert_eq!(config.top_k, 8);
        assert_eq!(config.n_repeats, 5);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.task, TaskType::Classification);
        assert_eq!(config.psi_bins, 10);
        assert_eq!(config.artifact_version, "1.0");
        assert!(config.model_name.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ExplainConfig::new()
            .with_top_k(6)
            .with_task(TaskType::Regression)
            .with_model_name("credit-risk");

        assert_eq!(config.top_k, 6);
        assert_eq!(config.task, TaskType::Regression);
        assert_eq!(config.model_name.as_deref(), Some("credit-risk"));
    }

    #[test]
    fn test_validate_rejects_zero_bins() {
        let err = ExplainConfig::new().with_psi_bins(0).validate().unwrap_err();
        assert!(matches!(err, ExplainError::InvalidParameter { ref name, .. } if name == "psi_bins"));
    }

    #[test]
    fn test_task_parse() {
        assert_eq!(TaskType::parse("Regression").unwrap(), TaskType::Regression);
        assert!(TaskType::parse("ranking").is_err());
        assert_eq!(TaskType::Classification.to_string(), "classification");
    }

    #[test]
    fn test_from_json_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_k": 3, "task": "regression"}}"#).unwrap();

        let config = ExplainConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.task, TaskType::Regression);
        assert_eq!(config.n_repeats, 5);
    }
}
