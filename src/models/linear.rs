//! Fixed-coefficient linear scorers

use crate::error::{ExplainError, Result};
use crate::model::Model;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

fn linear_predictor(x: &Array2<f64>, weights: &[f64], intercept: f64) -> Result<Array1<f64>> {
    if x.ncols() != weights.len() {
        return Err(ExplainError::ModelError(format!(
            "model expects {} features, got {}",
            weights.len(),
            x.ncols()
        )));
    }
    Ok(x.dot(&ArrayView1::from(weights)) + intercept)
}

/// Linear regression scorer: `x · weights + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Coefficients, one per feature
    pub weights: Vec<f64>,
    /// Intercept (bias)
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    /// Create a scorer from coefficients and intercept
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }
}

impl Model for LinearModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predictor(x, &self.weights, self.intercept)
    }

    fn model_type(&self) -> String {
        "LinearModel".to_string()
    }
}

/// Binary logistic scorer exposing class probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Coefficients, one per feature
    pub weights: Vec<f64>,
    /// Intercept (bias)
    #[serde(default)]
    pub intercept: f64,
    /// Probability at or above which class 1 is predicted
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl LogisticModel {
    /// Create a scorer from coefficients and intercept
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            weights,
            intercept,
            threshold: default_threshold(),
        }
    }

    /// Set the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Probability of class 1 for each row
    pub fn positive_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let linear = linear_predictor(x, &self.weights, self.intercept)?;
        Ok(Self::sigmoid(&linear))
    }
}

impl Model for LogisticModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.positive_proba(x)?;
        Ok(proba.mapv(|p| if p >= self.threshold { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let p1 = self.positive_proba(x)?.insert_axis(Axis(1));
        let p0 = p1.mapv(|p| 1.0 - p);
        Ok(ndarray::concatenate(Axis(1), &[p0.view(), p1.view()])?)
    }

    fn has_predict_proba(&self) -> bool {
        true
    }

    fn model_type(&self) -> String {
        "LogisticModel".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_predict() {
        let model = LinearModel::new(vec![1.0, 2.0], 0.5);
        let preds = model.predict(&array![[1.0, 1.0], [0.0, 2.0]]).unwrap();
        assert_eq!(preds, array![3.5, 4.5]);
    }

    #[test]
    fn test_linear_rejects_wrong_width() {
        let model = LinearModel::new(vec![1.0, 2.0], 0.0);
        let err = model.predict(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, ExplainError::ModelError(_)));
    }

    #[test]
    fn test_logistic_proba_rows_sum_to_one() {
        let model = LogisticModel::new(vec![1.0, -1.0], 0.0);
        let x = array![[2.0, 0.0], [0.0, 2.0], [1.0, 1.0]];
        let proba = model.predict_proba(&x).unwrap();

        assert_eq!(proba.dim(), (3, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!((proba[[2, 1]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_predict_labels() {
        let model = LogisticModel::new(vec![1.0], 0.0);
        let preds = model.predict(&array![[3.0], [-3.0], [0.0]]).unwrap();
        assert_eq!(preds, array![1.0, 0.0, 1.0]);
    }
}
