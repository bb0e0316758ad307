//! Permutation feature importance

use crate::config::TaskType;
use crate::data::check_feature_names;
use crate::error::{ExplainError, Result};
use crate::explainability::{sorted_desc_by, FeatureScores, GlobalExplanation};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraction of predictions matching the labels
///
/// Labels are numeric class ids; a prediction within 0.5 of the label
/// counts as correct.
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Coefficient of determination
///
/// With a constant target, a perfect fit scores 1.0 and anything else 0.0.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let y_mean = y_true.sum() / n as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Scoring metric used for permutation importance (higher is better)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scoring {
    Accuracy,
    R2,
}

impl Scoring {
    /// Accuracy for classification, R² for regression
    pub fn for_task(task: TaskType) -> Self {
        match task {
            TaskType::Classification => Scoring::Accuracy,
            TaskType::Regression => Scoring::R2,
        }
    }

    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        match self {
            Scoring::Accuracy => accuracy_score(y_true, y_pred),
            Scoring::R2 => r2_score(y_true, y_pred),
        }
    }
}

/// Result of feature importance computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceResult {
    /// Feature names, index-aligned with the score vectors
    pub feature_names: Vec<String>,
    /// Score on the unpermuted data
    pub baseline_score: f64,
    /// Mean score drop per feature
    pub importances_mean: Vec<f64>,
    /// Standard deviation of the score drop per feature
    pub importances_std: Vec<f64>,
    /// Raw score drops per repetition
    pub importances_raw: Vec<Vec<f64>>,
}

impl ImportanceResult {
    /// Feature indices by importance, descending; ties keep input order
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.importances_mean.len()).collect();
        indices.sort_by(|&a, &b| self.importances_mean[b].total_cmp(&self.importances_mean[a]));
        indices
    }

    /// Top k features as (index, mean importance)
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        self.sorted_indices()
            .into_iter()
            .take(k)
            .map(|i| (i, self.importances_mean[i]))
            .collect()
    }

    /// Named, sorted view of the result
    pub fn to_global_explanation(&self) -> GlobalExplanation {
        let mean: FeatureScores = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.importances_mean.iter().copied())
            .collect();
        let feature_importance = sorted_desc_by(mean, |v| v);
        let importances_std = feature_importance
            .keys()
            .map(|name| {
                let idx = self.feature_names.iter().position(|n| n == name).unwrap_or(0);
                (name.clone(), self.importances_std[idx])
            })
            .collect();

        GlobalExplanation {
            feature_importance,
            importances_std,
        }
    }
}

/// Permutation feature importance calculator
pub struct PermutationImportance<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>>,
{
    /// Prediction function
    predict_fn: F,
    /// Number of permutation repeats
    n_repeats: usize,
    /// Random seed
    seed: Option<u64>,
    /// Feature names
    feature_names: Option<Vec<String>>,
}

impl<F> PermutationImportance<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>>,
{
    /// Create new permutation importance calculator
    pub fn new(predict_fn: F) -> Self {
        Self {
            predict_fn,
            n_repeats: 5,
            seed: None,
            feature_names: None,
        }
    }

    /// Set number of permutation repeats
    pub fn with_n_repeats(mut self, n_repeats: usize) -> Self {
        self.n_repeats = n_repeats.max(1);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set feature names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Compute permutation importance with a built-in metric
    pub fn compute(&self, x: &Array2<f64>, y: &Array1<f64>, scoring: Scoring) -> Result<ImportanceResult> {
        self.compute_with_scorer(x, y, |y_true, y_pred| scoring.score(y_true, y_pred))
    }

    fn predict_checked(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let preds = (self.predict_fn)(x)?;
        if preds.len() != x.nrows() {
            return Err(ExplainError::ModelError(format!(
                "model returned {} predictions for {} rows",
                preds.len(),
                x.nrows()
            )));
        }
        Ok(preds)
    }

    /// Compute permutation importance with a custom scoring function
    ///
    /// `scorer` must grow with model quality; importance is the score drop.
    pub fn compute_with_scorer<S>(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        scorer: S,
    ) -> Result<ImportanceResult>
    where
        S: Fn(&Array1<f64>, &Array1<f64>) -> f64,
    {
        let n_features = x.ncols();
        let feature_names = match &self.feature_names {
            Some(names) => {
                check_feature_names(names, n_features)?;
                names.clone()
            }
            None => (0..n_features).map(|i| format!("feature_{}", i)).collect(),
        };
        if x.nrows() == 0 {
            return Err(ExplainError::ValidationError(
                "X must contain at least one row".to_string(),
            ));
        }
        if y.len() != x.nrows() {
            return Err(ExplainError::ValidationError(format!(
                "y length ({}) must match X rows ({})",
                y.len(),
                x.nrows()
            )));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let baseline_pred = self.predict_checked(x)?;
        let baseline_score = scorer(y, &baseline_pred);

        let mut importances_raw: Vec<Vec<f64>> = vec![Vec::with_capacity(self.n_repeats); n_features];
        let mut x_permuted = x.clone();

        for feature_idx in 0..n_features {
            let original = x.column(feature_idx);
            let mut col: Vec<f64> = original.to_vec();

            for _ in 0..self.n_repeats {
                col.shuffle(&mut rng);
                x_permuted.column_mut(feature_idx).assign(&Array1::from_vec(col.clone()));

                let permuted_pred = self.predict_checked(&x_permuted)?;
                let permuted_score = scorer(y, &permuted_pred);

                // Importance = how much worse the model gets
                importances_raw[feature_idx].push(baseline_score - permuted_score);
            }

            x_permuted.column_mut(feature_idx).assign(&original);
        }

        let importances_mean: Vec<f64> = importances_raw
            .iter()
            .map(|drops| drops.iter().sum::<f64>() / drops.len() as f64)
            .collect();

        let importances_std: Vec<f64> = importances_raw
            .iter()
            .zip(importances_mean.iter())
            .map(|(drops, mean)| {
                let variance =
                    drops.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / drops.len() as f64;
                variance.sqrt()
            })
            .collect();

        debug!(
            n_features,
            n_repeats = self.n_repeats,
            baseline_score,
            "Computed permutation importance"
        );

        Ok(ImportanceResult {
            feature_names,
            baseline_score,
            importances_mean,
            importances_std,
            importances_raw,
        })
    }
}
