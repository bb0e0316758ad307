//! Explainability pipeline
//!
//! Sequences one run over a dataset:
//! global importances (when labels are given), a median baseline, a
//! what-if explanation for one sample, reason codes, optional PSI against
//! a second dataset, and the bundle plus model card that carry it all.

use crate::audit::{
    DataSummary, ExplanationBundle, GlobalExplanations, LocalExplanations, ModelCard,
    ModelMetadata, StabilityReport,
};
use crate::config::ExplainConfig;
use crate::data::{check_feature_names, check_unique_names, column_medians, missing_counts, to_matrix};
use crate::drift::compute_psi;
use crate::error::{ExplainError, Result};
use crate::explainability::{Explainer, GlobalExplanation, PermutationExplainer};
use crate::model::Model;
use crate::reason_codes::{ReasonCodeConfig, ReasonCodeGenerator, ReasonTemplates, MAX_REASON_CODES};
use ndarray::{Array1, Array2};
use tracing::{debug, info};

/// Orchestrates explanations and audit artifacts for one model
pub struct ExplainablePipeline<M: Model> {
    model: M,
    feature_names: Vec<String>,
    config: ExplainConfig,
    explainer: PermutationExplainer,
    reason_gen: ReasonCodeGenerator,
}

impl<M: Model> ExplainablePipeline<M> {
    /// Create a pipeline; feature names must be unique and the config valid
    pub fn new(model: M, feature_names: Vec<String>, config: ExplainConfig) -> Result<Self> {
        config.validate()?;
        check_unique_names(&feature_names)?;

        let explainer = PermutationExplainer::new(config.n_repeats, config.random_state, config.task);
        let reason_gen = ReasonCodeGenerator::new().with_config(
            ReasonCodeConfig::default().with_top_k(config.top_k.min(MAX_REASON_CODES)),
        );

        Ok(Self {
            model,
            feature_names,
            config,
            explainer,
            reason_gen,
        })
    }

    /// Set per-feature reason-code templates
    pub fn with_reason_templates(mut self, templates: ReasonTemplates) -> Self {
        self.reason_gen = self.reason_gen.with_templates(templates);
        self
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Convert row vectors into a matrix; ragged rows are rejected
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
        to_matrix(rows)
    }

    /// Explain row-vector input
    pub fn explain_rows(
        &self,
        rows: &[Vec<f64>],
        y_true: Option<&Array1<f64>>,
        score_rows: Option<&[Vec<f64>]>,
        sample_index: usize,
    ) -> Result<ExplanationBundle> {
        let x = Self::from_rows(rows)?;
        let score_x = score_rows.map(Self::from_rows).transpose()?;
        self.explain_batch(&x, y_true, score_x.as_ref(), sample_index)
    }

    /// Run the full pipeline over `x`
    ///
    /// Without labels the global block is all zeros. `sample_index` is
    /// clamped into the valid row range.
    pub fn explain_batch(
        &self,
        x: &Array2<f64>,
        y_true: Option<&Array1<f64>>,
        score_x_for_stability: Option<&Array2<f64>>,
        sample_index: usize,
    ) -> Result<ExplanationBundle> {
        check_feature_names(&self.feature_names, x.ncols())?;
        if x.nrows() == 0 {
            return Err(ExplainError::ValidationError(
                "X must contain at least one row".to_string(),
            ));
        }

        info!(
            n_rows = x.nrows(),
            n_cols = x.ncols(),
            has_labels = y_true.is_some(),
            has_stability_data = score_x_for_stability.is_some(),
            "Running explainability pipeline"
        );

        let global = match y_true {
            Some(y) => self
                .explainer
                .explain_global(&self.model, x, y, &self.feature_names)?,
            None => {
                debug!("No labels supplied, global importances set to zero");
                GlobalExplanation::zeros(&self.feature_names)
            }
        };

        let baseline = column_medians(x);
        let sample_index = clamp_index(sample_index, x.nrows());
        let local = self.explainer.explain_local(
            &self.model,
            x.row(sample_index),
            &self.feature_names,
            baseline.view(),
        )?;

        let reason_codes = self.reason_gen.generate(&local.feature_contributions);

        let stability = match score_x_for_stability {
            Some(score_x) => {
                let psi = compute_psi(x, score_x, &self.feature_names, self.config.psi_bins)?;
                Some(StabilityReport {
                    psi,
                    bins: self.config.psi_bins,
                })
            }
            None => None,
        };

        let data_summary = self.data_summary(x);
        let model_meta = self.model_meta();

        let card = ModelCard::generate(
            self.config.model_name.as_deref().unwrap_or("Model"),
            &model_meta.model_type,
            data_summary.n_rows,
            data_summary.n_cols,
            global.top_features(self.config.top_k),
        );

        info!(
            sample_index,
            n_reason_codes = reason_codes.len(),
            "Explainability bundle assembled"
        );

        Ok(ExplanationBundle {
            schema_version: self.config.artifact_version.clone(),
            model: model_meta,
            data_summary,
            global_explanations: GlobalExplanations {
                permutation_importance: global.top_k(self.config.top_k),
            },
            local_explanations: LocalExplanations {
                sample_index,
                what_if_contributions: local.top_k(self.config.top_k),
            },
            reason_codes,
            stability,
            model_card_markdown: Some(card.to_markdown()),
        })
    }

    fn data_summary(&self, x: &Array2<f64>) -> DataSummary {
        let missing_by_feature = self
            .feature_names
            .iter()
            .cloned()
            .zip(missing_counts(x))
            .collect();

        DataSummary {
            n_rows: x.nrows(),
            n_cols: x.ncols(),
            missing_by_feature,
        }
    }

    fn model_meta(&self) -> ModelMetadata {
        ModelMetadata {
            name: self
                .config
                .model_name
                .clone()
                .unwrap_or_else(|| "unnamed-model".to_string()),
            model_type: self.model.model_type(),
            task: self.config.task.to_string(),
            framework: self.model.framework(),
            artifact_schema_version: self.config.artifact_version.clone(),
        }
    }
}

/// Clamp `index` into `[0, n_rows - 1]`
fn clamp_index(index: usize, n_rows: usize) -> usize {
    index.min(n_rows.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskType;
    use crate::models::{LinearModel, LogisticModel};
    use crate::reason_codes::ReasonTemplate;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{:02}", i)).collect()
    }

    fn dataset(n_rows: usize) -> Array2<f64> {
        Array2::from_shape_fn((n_rows, 3), |(i, j)| ((i * (j + 3)) % 11) as f64 - 5.0)
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(10_000, 50), 49);
        assert_eq!(clamp_index(3, 50), 3);
        assert_eq!(clamp_index(0, 1), 0);
    }

    #[test]
    fn test_duplicate_feature_names_rejected() {
        let model = LinearModel::new(vec![1.0, 1.0], 0.0);
        let result = ExplainablePipeline::new(
            model,
            vec!["a".to_string(), "a".to_string()],
            ExplainConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let model = LinearModel::new(vec![1.0], 0.0);
        let config = ExplainConfig::default().with_n_repeats(0);
        assert!(ExplainablePipeline::new(model, names(1), config).is_err());
    }

    #[test]
    fn test_no_labels_gives_zero_global() {
        let model = LinearModel::new(vec![1.0, -2.0, 0.5], 0.0);
        let config = ExplainConfig::default().with_task(TaskType::Regression);
        let pipe = ExplainablePipeline::new(model, names(3), config).unwrap();

        let bundle = pipe.explain_batch(&dataset(20), None, None, 0).unwrap();
        let global = &bundle.global_explanations.permutation_importance;
        assert_eq!(global.len(), 3);
        assert!(global.values().all(|v| *v == 0.0));
        assert!(bundle.stability.is_none());
    }

    #[test]
    fn test_sample_index_clamped() {
        let model = LinearModel::new(vec![1.0, 1.0, 1.0], 0.0);
        let config = ExplainConfig::default().with_task(TaskType::Regression);
        let pipe = ExplainablePipeline::new(model, names(3), config).unwrap();

        let bundle = pipe.explain_batch(&dataset(50), None, None, 10_000).unwrap();
        assert_eq!(bundle.local_explanations.sample_index, 49);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = LinearModel::new(vec![1.0, 1.0, 1.0], 0.0);
        let pipe = ExplainablePipeline::new(model, names(2), ExplainConfig::default()).unwrap();
        let err = pipe.explain_batch(&dataset(5), None, None, 0).unwrap_err();
        assert!(matches!(err, ExplainError::ValidationError(_)));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let model = LinearModel::new(vec![1.0, 1.0, 1.0], 0.0);
        let pipe = ExplainablePipeline::new(model, names(3), ExplainConfig::default()).unwrap();
        let err = pipe.explain_batch(&Array2::zeros((0, 3)), None, None, 0).unwrap_err();
        assert!(matches!(err, ExplainError::ValidationError(_)));
    }

    #[test]
    fn test_top_k_truncates_bundle() {
        let model = LinearModel::new(vec![1.0, 2.0, 3.0], 0.0);
        let config = ExplainConfig::default()
            .with_task(TaskType::Regression)
            .with_top_k(2);
        let pipe = ExplainablePipeline::new(model, names(3), config).unwrap();

        let x = dataset(30);
        let y = x.column(2).mapv(|v| v * 3.0);
        let bundle = pipe.explain_batch(&x, Some(&y), Some(&x), 1).unwrap();

        assert_eq!(bundle.global_explanations.permutation_importance.len(), 2);
        assert_eq!(bundle.local_explanations.what_if_contributions.len(), 2);
        assert_eq!(bundle.reason_codes.len(), 2);
        assert_eq!(bundle.stability.as_ref().unwrap().psi.len(), 3);
        assert_eq!(bundle.stability.as_ref().unwrap().bins, 10);
    }

    #[test]
    fn test_templates_flow_into_reason_codes() {
        let model = LogisticModel::new(vec![3.0, 0.0], 0.0);
        let mut templates = ReasonTemplates::new();
        templates.insert(
            "f00".to_string(),
            ReasonTemplate::new("Higher f00 increases risk score.", "Lower f00 decreases risk score."),
        );
        let pipe = ExplainablePipeline::new(model, names(2), ExplainConfig::default())
            .unwrap()
            .with_reason_templates(templates);

        let x = Array2::from_shape_fn((9, 2), |(i, _)| i as f64);
        let bundle = pipe.explain_batch(&x, None, None, 8).unwrap();

        assert_eq!(bundle.reason_codes[0].feature, "f00");
        assert_eq!(bundle.reason_codes[0].message, "Higher f00 increases risk score.");
    }

    #[test]
    fn test_explain_rows_rejects_ragged() {
        let model = LinearModel::new(vec![1.0, 1.0], 0.0);
        let pipe = ExplainablePipeline::new(model, names(2), ExplainConfig::default()).unwrap();
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(pipe.explain_rows(&rows, None, None, 0).is_err());
        assert!(ExplainablePipeline::<LinearModel>::from_rows(&rows).is_err());

        let ok = ExplainablePipeline::<LinearModel>::from_rows(&[vec![1.0, 2.0]]).unwrap();
        assert_eq!(ok.dim(), (1, 2));
    }

    #[test]
    fn test_metadata_defaults() {
        let model = LinearModel::new(vec![1.0, 1.0, 1.0], 0.0);
        let pipe = ExplainablePipeline::new(model, names(3), ExplainConfig::default()).unwrap();
        let bundle = pipe.explain_batch(&dataset(4), None, None, 0).unwrap();

        assert_eq!(bundle.model.name, "unnamed-model");
        assert_eq!(bundle.model.model_type, "LinearModel");
        assert_eq!(bundle.model.task, "classification");
        assert_eq!(bundle.schema_version, "1.0");
        let card = bundle.model_card_markdown.unwrap();
        assert!(card.starts_with("# Model - Explainability Model Card"));
    }
}
