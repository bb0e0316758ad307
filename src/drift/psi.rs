//! Population Stability Index

use crate::data::{check_feature_names, quantile_sorted, sorted_finite};
use crate::drift::{DriftDetector, DriftResult, PsiSeverity, PSI_MODERATE, PSI_SEVERE};
use crate::error::{ExplainError, Result};
use crate::explainability::FeatureScores;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Floor applied to every bin proportion before the log ratio
pub const PSI_EPSILON: f64 = 1e-8;

/// Bin edges from reference quantiles at 0, 1/bins, ..., 1, with the outer
/// edges opened to -inf and +inf
fn bin_edges(reference: ArrayView1<f64>, bins: usize) -> Vec<f64> {
    let sorted = sorted_finite(reference);
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| {
            if sorted.is_empty() {
                0.0
            } else {
                quantile_sorted(&sorted, i as f64 / bins as f64)
            }
        })
        .collect();
    edges[0] = f64::NEG_INFINITY;
    edges[bins] = f64::INFINITY;
    edges
}

/// Bin proportions of `data` over `edges`, floored at [`PSI_EPSILON`]
///
/// Bin `i` holds `[edges[i], edges[i + 1])`; the last bin is closed.
/// NaN values are skipped.
fn bin_proportions(data: ArrayView1<f64>, edges: &[f64]) -> Vec<f64> {
    let bins = edges.len() - 1;
    let mut counts = vec![0usize; bins];

    for &value in data.iter().filter(|v| !v.is_nan()) {
        let idx = edges.partition_point(|&e| e <= value).saturating_sub(1);
        counts[idx.min(bins - 1)] += 1;
    }

    let total = counts.iter().sum::<usize>().max(1) as f64;
    counts
        .iter()
        .map(|&c| (c as f64 / total).max(PSI_EPSILON))
        .collect()
}

fn psi_for_column(reference: ArrayView1<f64>, comparison: ArrayView1<f64>, bins: usize) -> f64 {
    let edges = bin_edges(reference, bins);
    let ref_props = bin_proportions(reference, &edges);
    let cmp_props = bin_proportions(comparison, &edges);

    ref_props
        .iter()
        .zip(cmp_props.iter())
        .map(|(&p_ref, &p_cmp)| (p_cmp - p_ref) * (p_cmp / p_ref).ln())
        .sum()
}

/// Per-feature PSI between a reference and a comparison dataset
///
/// Both matrices must have the same number of columns and `feature_names`
/// must name each of them. Larger values mean more drift.
pub fn compute_psi(
    reference: &Array2<f64>,
    comparison: &Array2<f64>,
    feature_names: &[String],
    bins: usize,
) -> Result<FeatureScores> {
    if reference.ncols() != comparison.ncols() {
        return Err(ExplainError::ValidationError(format!(
            "reference and comparison must have the same number of columns ({} vs {})",
            reference.ncols(),
            comparison.ncols()
        )));
    }
    check_feature_names(feature_names, reference.ncols())?;
    if bins == 0 {
        return Err(ExplainError::InvalidParameter {
            name: "bins".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let scores: FeatureScores = feature_names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let psi = psi_for_column(reference.column(j), comparison.column(j), bins);
            (name.clone(), psi)
        })
        .collect();

    debug!(
        n_features = scores.len(),
        bins,
        reference_rows = reference.nrows(),
        comparison_rows = comparison.nrows(),
        "Computed PSI"
    );

    Ok(scores)
}

/// Single-feature PSI detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationStabilityIndex {
    /// Number of quantile bins
    n_bins: usize,
    /// Moderate-shift threshold
    warning_threshold: f64,
    /// Severe-shift threshold
    critical_threshold: f64,
}

impl PopulationStabilityIndex {
    /// Create new PSI calculator
    pub fn new(n_bins: usize) -> Self {
        Self {
            n_bins: n_bins.max(1),
            warning_threshold: PSI_MODERATE,
            critical_threshold: PSI_SEVERE,
        }
    }

    /// Set custom thresholds
    pub fn with_thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = warning.max(0.0);
        self.critical_threshold = critical.max(self.warning_threshold);
        self
    }

    /// Number of bins in use
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Raw PSI score for one pair of columns
    pub fn score(&self, reference: ArrayView1<f64>, comparison: ArrayView1<f64>) -> f64 {
        psi_for_column(reference, comparison, self.n_bins)
    }
}

impl Default for PopulationStabilityIndex {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DriftDetector for PopulationStabilityIndex {
    fn detect(&self, reference: ArrayView1<f64>, comparison: ArrayView1<f64>) -> Result<DriftResult> {
        if reference.is_empty() || comparison.is_empty() {
            return Err(ExplainError::ValidationError(
                "Empty arrays provided".to_string(),
            ));
        }

        let psi = self.score(reference, comparison);
        let severity =
            PsiSeverity::classify_with(psi, self.warning_threshold, self.critical_threshold);

        match severity {
            PsiSeverity::Severe => Ok(DriftResult::drift(
                psi,
                self.critical_threshold,
                severity,
                &format!(
                    "PSI ({:.4}) exceeds critical threshold ({:.4})",
                    psi, self.critical_threshold
                ),
            )),
            PsiSeverity::Moderate => Ok(DriftResult::drift(
                psi,
                self.warning_threshold,
                severity,
                &format!(
                    "PSI ({:.4}) exceeds warning threshold ({:.4})",
                    psi, self.warning_threshold
                ),
            )),
            PsiSeverity::Stable => Ok(DriftResult::no_drift(psi, self.warning_threshold)),
        }
    }

    fn threshold(&self) -> f64 {
        self.warning_threshold
    }
}
