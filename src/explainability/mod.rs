//! Model explainability module
//!
//! Model-agnostic explanations built only on `predict` / `predict_proba`:
//! - Global: permutation feature importance (score drop when a column is
//!   shuffled)
//! - Local: what-if contributions (prediction change when one feature is
//!   swapped for its baseline value)
//!
//! Both are perturbation-based approximations. Local contributions ignore
//! feature interactions.

mod importance;
mod local_explanations;

pub use importance::{accuracy_score, r2_score, ImportanceResult, PermutationImportance, Scoring};
pub use local_explanations::WhatIfExplainer;

use crate::config::TaskType;
use crate::error::Result;
use crate::model::Model;
use indexmap::IndexMap;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Insertion-ordered mapping from feature name to score
pub type FeatureScores = IndexMap<String, f64>;

/// Stable re-ordering of `scores` by descending `key(value)`
pub(crate) fn sorted_desc_by<F>(scores: FeatureScores, key: F) -> FeatureScores
where
    F: Fn(f64) -> f64,
{
    let mut entries: Vec<(String, f64)> = scores.into_iter().collect();
    entries.sort_by(|a, b| key(b.1).total_cmp(&key(a.1)));
    entries.into_iter().collect()
}

fn first_k(scores: &FeatureScores, k: usize) -> FeatureScores {
    scores
        .iter()
        .take(k)
        .map(|(name, value)| (name.clone(), *value))
        .collect()
}

/// Dataset-level feature ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalExplanation {
    /// Feature name -> mean score drop, sorted descending
    #[serde(with = "crate::serde_float::scores")]
    pub feature_importance: FeatureScores,
    /// Feature name -> standard deviation of the drop across repeats
    #[serde(with = "crate::serde_float::scores")]
    pub importances_std: FeatureScores,
}

impl GlobalExplanation {
    /// Placeholder used when no labels are available: every feature scores 0
    pub fn zeros(feature_names: &[String]) -> Self {
        let zeros: FeatureScores = feature_names.iter().map(|n| (n.clone(), 0.0)).collect();
        Self {
            feature_importance: zeros.clone(),
            importances_std: zeros,
        }
    }

    /// The `k` most important features with their scores
    pub fn top_k(&self, k: usize) -> FeatureScores {
        first_k(&self.feature_importance, k)
    }

    /// Names of the `k` most important features
    pub fn top_features(&self, k: usize) -> Vec<String> {
        self.feature_importance.keys().take(k).cloned().collect()
    }
}

/// Single-row signed attribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExplanation {
    /// Prediction proxy for the unperturbed row
    #[serde(with = "crate::serde_float")]
    pub prediction: f64,
    /// Feature name -> signed contribution, sorted by descending magnitude
    #[serde(with = "crate::serde_float::scores")]
    pub feature_contributions: FeatureScores,
}

impl LocalExplanation {
    /// The `k` largest contributions by magnitude
    pub fn top_k(&self, k: usize) -> FeatureScores {
        first_k(&self.feature_contributions, k)
    }
}

/// Global and local explanation capability
pub trait Explainer {
    /// Rank features by how much the model relies on them over `x`
    fn explain_global(
        &self,
        model: &dyn Model,
        x: &Array2<f64>,
        y: &Array1<f64>,
        feature_names: &[String],
    ) -> Result<GlobalExplanation>;

    /// Attribute one row's prediction to its features relative to `baseline`
    fn explain_local(
        &self,
        model: &dyn Model,
        row: ArrayView1<f64>,
        feature_names: &[String],
        baseline: ArrayView1<f64>,
    ) -> Result<LocalExplanation>;
}

/// Model-agnostic explainer: permutation importance + what-if contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationExplainer {
    /// Permutation repeats per feature
    pub n_repeats: usize,
    /// Seed for permutations
    pub random_state: u64,
    /// Task kind; selects the scoring metric and the prediction proxy
    pub task: TaskType,
}

impl Default for PermutationExplainer {
    fn default() -> Self {
        Self {
            n_repeats: 5,
            random_state: 42,
            task: TaskType::Classification,
        }
    }
}

impl PermutationExplainer {
    pub fn new(n_repeats: usize, random_state: u64, task: TaskType) -> Self {
        Self {
            n_repeats,
            random_state,
            task,
        }
    }
}

impl Explainer for PermutationExplainer {
    fn explain_global(
        &self,
        model: &dyn Model,
        x: &Array2<f64>,
        y: &Array1<f64>,
        feature_names: &[String],
    ) -> Result<GlobalExplanation> {
        let result = PermutationImportance::new(|data: &Array2<f64>| model.predict(data))
            .with_n_repeats(self.n_repeats)
            .with_seed(self.random_state)
            .with_feature_names(feature_names.to_vec())
            .compute(x, y, Scoring::for_task(self.task))?;
        Ok(result.to_global_explanation())
    }

    fn explain_local(
        &self,
        model: &dyn Model,
        row: ArrayView1<f64>,
        feature_names: &[String],
        baseline: ArrayView1<f64>,
    ) -> Result<LocalExplanation> {
        WhatIfExplainer::new(self.task).explain(model, row, feature_names, baseline)
    }
}
