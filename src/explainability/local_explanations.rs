//! Local what-if explanations

use crate::config::TaskType;
use crate::error::{ExplainError, Result};
use crate::explainability::{sorted_desc_by, FeatureScores, LocalExplanation};
use crate::model::Model;
use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

/// What-if explainer
///
/// For each feature, swaps the row's value for the baseline value and
/// records how far the prediction proxy moves. A positive contribution
/// means the actual value raises the prediction relative to the baseline.
/// Costs one model call per feature plus one for the unperturbed row.
#[derive(Debug, Clone, Copy)]
pub struct WhatIfExplainer {
    task: TaskType,
}

impl WhatIfExplainer {
    /// Create a new explainer for the given task
    pub fn new(task: TaskType) -> Self {
        Self { task }
    }

    /// Scalar prediction proxy for a single-row matrix
    ///
    /// Classification models with probabilities yield the probability of
    /// class 1 (or the only column when just one is exposed). Everything
    /// else yields the raw prediction.
    pub fn predict_scalar(&self, model: &dyn Model, x: &Array2<f64>) -> Result<f64> {
        if self.task == TaskType::Classification && model.has_predict_proba() {
            let proba = model.predict_proba(x)?;
            let col = if proba.ncols() >= 2 { 1 } else { 0 };
            return proba.get((0, col)).copied().ok_or_else(|| {
                ExplainError::ModelError("predict_proba returned no probabilities".to_string())
            });
        }
        let preds = model.predict(x)?;
        preds
            .first()
            .copied()
            .ok_or_else(|| ExplainError::ModelError("predict returned no predictions".to_string()))
    }

    /// Explain a single row against a baseline row
    pub fn explain(
        &self,
        model: &dyn Model,
        row: ArrayView1<f64>,
        feature_names: &[String],
        baseline: ArrayView1<f64>,
    ) -> Result<LocalExplanation> {
        if baseline.len() != row.len() {
            return Err(ExplainError::shape("baseline length", row.len(), baseline.len()));
        }
        if feature_names.len() != row.len() {
            return Err(ExplainError::ValidationError(format!(
                "feature_names length ({}) must match row length ({})",
                feature_names.len(),
                row.len()
            )));
        }

        let x = row.to_owned().insert_axis(Axis(0));
        let prediction = self.predict_scalar(model, &x)?;

        let mut contributions = FeatureScores::with_capacity(feature_names.len());
        let mut x_perturbed = x.clone();
        for (j, name) in feature_names.iter().enumerate() {
            x_perturbed[[0, j]] = baseline[j];
            let perturbed = self.predict_scalar(model, &x_perturbed)?;
            x_perturbed[[0, j]] = row[j];
            contributions.insert(name.clone(), prediction - perturbed);
        }

        debug!(n_features = feature_names.len(), prediction, "Computed what-if contributions");

        Ok(LocalExplanation {
            prediction,
            feature_contributions: sorted_desc_by(contributions, f64::abs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictFn;
    use crate::models::{LinearModel, LogisticModel};
    use ndarray::{array, Array1};

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_contributions_are_exact() {
        // Additive model: contribution_j = w_j * (x_j - baseline_j)
        let model = LinearModel::new(vec![1.0, 2.0, 3.0], 0.0);
        let explainer = WhatIfExplainer::new(TaskType::Regression);

        let row = array![1.0, 2.0, 3.0];
        let baseline = array![0.0, 0.0, 4.0];
        let local = explainer
            .explain(&model, row.view(), &names(&["a", "b", "c"]), baseline.view())
            .unwrap();

        assert_eq!(local.prediction, 14.0);
        assert_eq!(local.feature_contributions["a"], 1.0);
        assert_eq!(local.feature_contributions["b"], 4.0);
        assert_eq!(local.feature_contributions["c"], -3.0);

        let keys: Vec<&str> = local.feature_contributions.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sorted_by_non_increasing_magnitude() {
        let model = LinearModel::new(vec![0.5, -4.0, 1.0, 2.0], 1.0);
        let explainer = WhatIfExplainer::new(TaskType::Regression);
        let row = array![3.0, 1.0, -2.0, 0.5];
        let baseline = Array1::zeros(4);

        let local = explainer
            .explain(&model, row.view(), &names(&["w", "x", "y", "z"]), baseline.view())
            .unwrap();

        let mags: Vec<f64> = local.feature_contributions.values().map(|v| v.abs()).collect();
        assert!(mags.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(local.feature_contributions.len(), 4);
    }

    #[test]
    fn test_classification_uses_positive_class_probability() {
        let model = LogisticModel::new(vec![2.0], 0.0);
        let explainer = WhatIfExplainer::new(TaskType::Classification);

        let row = array![1.0];
        let baseline = array![0.0];
        let local = explainer
            .explain(&model, row.view(), &names(&["score"]), baseline.view())
            .unwrap();

        let p = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((local.prediction - p).abs() < 1e-12);
        assert!((local.feature_contributions["score"] - (p - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_classification_without_proba_uses_predict() {
        let model = PredictFn::new(|x: &Array2<f64>| Ok(x.column(0).mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })));
        let explainer = WhatIfExplainer::new(TaskType::Classification);

        let row = array![5.0, 1.0];
        let baseline = array![-1.0, 0.0];
        let local = explainer
            .explain(&model, row.view(), &names(&["a", "b"]), baseline.view())
            .unwrap();

        assert_eq!(local.feature_contributions["a"], 1.0);
        assert_eq!(local.feature_contributions["b"], 0.0);
    }

    #[test]
    fn test_baseline_length_mismatch() {
        let model = LinearModel::new(vec![1.0, 1.0], 0.0);
        let explainer = WhatIfExplainer::new(TaskType::Regression);
        let row = array![1.0, 2.0];
        let baseline = array![0.0];
        let err = explainer
            .explain(&model, row.view(), &names(&["a", "b"]), baseline.view())
            .unwrap_err();
        assert!(matches!(err, ExplainError::ShapeError { .. }));
        assert_eq!(err.to_string(), "Invalid shape: expected baseline length = 2, got 1");
    }

    #[test]
    fn test_empty_model_output_is_model_error() {
        let model = PredictFn::new(|_: &Array2<f64>| Ok(Array1::zeros(0)));
        let explainer = WhatIfExplainer::new(TaskType::Regression);
        let row = array![1.0];
        let err = explainer
            .explain(&model, row.view(), &names(&["a"]), row.view())
            .unwrap_err();
        assert!(matches!(err, ExplainError::ModelError(_)));
    }
}
