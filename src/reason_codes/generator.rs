//! Reason code generation

use crate::explainability::{sorted_desc_by, FeatureScores};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Hard ceiling on the number of reason codes per explanation
pub const MAX_REASON_CODES: usize = 8;

/// Direction in which a feature moves the prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// One ranked, human-readable explanation statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonCode {
    /// Positional identifier, e.g. `RC-01`
    pub code: String,
    pub message: String,
    pub feature: String,
    pub direction: Direction,
    /// Absolute contribution; never negative (NaN when the contribution is)
    #[serde(with = "crate::serde_float")]
    pub strength: f64,
}

/// Message pair for one feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonTemplate {
    /// Message when the feature pushes the prediction up
    pub up: String,
    /// Message when the feature pushes the prediction down
    pub down: String,
}

impl ReasonTemplate {
    pub fn new(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            up: up.into(),
            down: down.into(),
        }
    }

    fn message(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

/// Feature name -> message pair
pub type ReasonTemplates = HashMap<String, ReasonTemplate>;

/// Load templates from a JSON object of `{"feature": {"up": .., "down": ..}}`
pub fn load_templates(path: impl AsRef<Path>) -> crate::error::Result<ReasonTemplates> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Reason code generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonCodeConfig {
    /// Number of codes to emit, at most [`MAX_REASON_CODES`]
    pub top_k: usize,
    /// Contributions at or above this value are `up`
    pub positive_threshold: f64,
    /// Code prefix
    pub prefix: String,
}

impl Default for ReasonCodeConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            positive_threshold: 0.0,
            prefix: "RC".to_string(),
        }
    }
}

impl ReasonCodeConfig {
    /// Set the number of codes, clamped to [`MAX_REASON_CODES`]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.min(MAX_REASON_CODES);
        self
    }

    pub fn with_positive_threshold(mut self, threshold: f64) -> Self {
        self.positive_threshold = threshold;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn direction(&self, value: f64) -> Direction {
        if value >= self.positive_threshold {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Turns local contributions into reason codes
#[derive(Debug, Clone, Default)]
pub struct ReasonCodeGenerator {
    templates: ReasonTemplates,
    config: ReasonCodeConfig,
}

impl ReasonCodeGenerator {
    /// Create a generator with generic messages and default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-feature message templates
    pub fn with_templates(mut self, templates: ReasonTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Set generation settings
    pub fn with_config(mut self, config: ReasonCodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReasonCodeConfig {
        &self.config
    }

    /// Rank `contributions` by magnitude and emit up to `top_k` codes
    ///
    /// Input order is irrelevant except for ties, which keep it.
    pub fn generate(&self, contributions: &FeatureScores) -> Vec<ReasonCode> {
        let limit = self.config.top_k.min(MAX_REASON_CODES);
        let ranked = sorted_desc_by(contributions.clone(), f64::abs);

        ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(k, (feature, value))| {
                let direction = self.config.direction(value);
                ReasonCode {
                    code: format!("{}-{:02}", self.config.prefix, k + 1),
                    message: self.format_message(&feature, direction),
                    feature,
                    direction,
                    strength: value.abs(),
                }
            })
            .collect()
    }

    fn format_message(&self, feature: &str, direction: Direction) -> String {
        if let Some(template) = self.templates.get(feature) {
            let msg = template.message(direction);
            if !msg.trim().is_empty() {
                return msg.to_string();
            }
        }

        match direction {
            Direction::Up => format!(
                "{} is a key driver increasing the model score (relative to baseline).",
                feature
            ),
            Direction::Down => format!(
                "{} is a key driver decreasing the model score (relative to baseline).",
                feature
            ),
        }
    }
}
