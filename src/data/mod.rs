//! Numeric dataset helpers
//!
//! Matrix conversion, feature-name contracts and per-column statistics
//! shared by the explainers, the stability metric and the pipeline.

mod loader;

pub use loader::{load_csv, Dataset};

use crate::error::{ExplainError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashSet;

/// Build a matrix from row vectors, rejecting ragged input
pub fn to_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(ExplainError::ValidationError(format!(
            "X must be 2D: row {} has {} values, expected {}",
            idx,
            row.len(),
            n_cols
        )));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((rows.len(), n_cols), flat)?)
}

/// Check that `names` index-aligns with `n_cols` matrix columns
pub fn check_feature_names(names: &[String], n_cols: usize) -> Result<()> {
    if names.len() != n_cols {
        return Err(ExplainError::ValidationError(format!(
            "feature_names length ({}) must match X columns ({})",
            names.len(),
            n_cols
        )));
    }
    Ok(())
}

/// Reject duplicate feature names
pub fn check_unique_names(names: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ExplainError::ValidationError(format!(
                "duplicate feature name: {}",
                name
            )));
        }
    }
    Ok(())
}

/// Non-missing values of a column, sorted ascending
pub fn sorted_finite(column: ArrayView1<f64>) -> Vec<f64> {
    let mut values: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Empirical quantile of sorted data with linear interpolation
///
/// Returns NaN for empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            if lo == hi {
                sorted[lo]
            } else {
                sorted[lo] + (sorted[hi] - sorted[lo]) * frac
            }
        }
    }
}

/// Per-column median, ignoring NaN; an all-missing column yields NaN
pub fn column_medians(x: &Array2<f64>) -> Array1<f64> {
    x.columns()
        .into_iter()
        .map(|col| quantile_sorted(&sorted_finite(col), 0.5))
        .collect()
}

/// Per-column count of NaN values
pub fn missing_counts(x: &Array2<f64>) -> Vec<usize> {
    x.columns()
        .into_iter()
        .map(|col| col.iter().filter(|v| v.is_nan()).count())
        .collect()
}
