//! Model capability consumed by the explainers
//!
//! The explainers never look inside a model. Anything that can score a
//! row matrix (tree ensembles, linear scorers, a remote service behind a
//! blocking client) is explained through this trait.

use crate::error::{ExplainError, Result};
use ndarray::{Array1, Array2};

/// Predictive model as seen by the explainers
pub trait Model: Send + Sync {
    /// One scalar prediction per row (class id for classifiers)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Per-class probabilities, one row per input row
    fn predict_proba(&self, _x: &Array2<f64>) -> Result<Array2<f64>> {
        Err(ExplainError::ModelError(format!(
            "{} does not expose class probabilities",
            self.model_type()
        )))
    }

    /// Whether `predict_proba` is available
    fn has_predict_proba(&self) -> bool {
        false
    }

    /// Short adapter name recorded in artifacts
    fn model_type(&self) -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }

    /// Framework that produced the model
    fn framework(&self) -> String {
        format!("kolosal-explain v{}", env!("CARGO_PKG_VERSION"))
    }
}

impl<M: Model + ?Sized> Model for &M {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        (**self).predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        (**self).predict_proba(x)
    }

    fn has_predict_proba(&self) -> bool {
        (**self).has_predict_proba()
    }

    fn model_type(&self) -> String {
        (**self).model_type()
    }

    fn framework(&self) -> String {
        (**self).framework()
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        (**self).predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        (**self).predict_proba(x)
    }

    fn has_predict_proba(&self) -> bool {
        (**self).has_predict_proba()
    }

    fn model_type(&self) -> String {
        (**self).model_type()
    }

    fn framework(&self) -> String {
        (**self).framework()
    }
}

/// Adapts a prediction closure into a [`Model`]
pub struct PredictFn<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Send + Sync,
{
    predict_fn: F,
    name: String,
}

impl<F> PredictFn<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Send + Sync,
{
    /// Wrap a prediction function
    pub fn new(predict_fn: F) -> Self {
        Self {
            predict_fn,
            name: "PredictFn".to_string(),
        }
    }

    /// Set the name reported as the model type
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> Model for PredictFn<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Send + Sync,
{
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        (self.predict_fn)(x)
    }

    fn model_type(&self) -> String {
        self.name.clone()
    }
}
