//! CSV loading into numeric matrices

use crate::error::{ExplainError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Numeric dataset loaded from disk
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature column names, in file order
    pub feature_names: Vec<String>,
    /// Feature matrix (rows × features); nulls become NaN
    pub x: Array2<f64>,
    /// Target column, when requested
    pub target: Option<Array1<f64>>,
}

fn column_values(series: &Series) -> Result<Vec<f64>> {
    if !series.dtype().is_numeric() && *series.dtype() != DataType::Boolean {
        return Err(ExplainError::DataError(format!(
            "column {} is not numeric ({})",
            series.name(),
            series.dtype()
        )));
    }
    let cast = series.cast(&DataType::Float64)?;
    let values = cast
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Load a headered CSV file; every column except `target` becomes a feature
pub fn load_csv(path: impl AsRef<Path>, target: Option<&str>) -> Result<Dataset> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let n_rows = df.height();
    let mut feature_names = Vec::new();
    let mut flat_columns: Vec<Vec<f64>> = Vec::new();
    let mut target_values = None;

    for series in df.get_columns() {
        let name = series.name().to_string();
        let values = column_values(series)?;
        if target == Some(name.as_str()) {
            target_values = Some(Array1::from_vec(values));
        } else {
            feature_names.push(name);
            flat_columns.push(values);
        }
    }

    if let Some(target) = target {
        if target_values.is_none() {
            return Err(ExplainError::DataError(format!(
                "target column {} not found in {}",
                target,
                path.display()
            )));
        }
    }

    let n_cols = feature_names.len();
    let x = Array2::from_shape_fn((n_rows, n_cols), |(i, j)| flat_columns[j][i]);

    debug!(path = %path.display(), n_rows, n_cols, "Loaded dataset");

    Ok(Dataset {
        feature_names,
        x,
        target: target_values,
    })
}
