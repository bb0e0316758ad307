//! Error types for the explainability pipeline

use thiserror::Error;

/// Result type alias for explainability operations
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Main error type for the explainability pipeline
#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Missing artifact: {0}")]
    MissingArtifact(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ExplainError {
    /// Shape mismatch between an expected and an observed dimension
    pub(crate) fn shape(what: &str, expected: usize, actual: usize) -> Self {
        ExplainError::ShapeError {
            expected: format!("{} = {}", what, expected),
            actual: actual.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for ExplainError {
    fn from(err: polars::error::PolarsError) -> Self {
        ExplainError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ExplainError {
    fn from(err: serde_json::Error) -> Self {
        ExplainError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ExplainError {
    fn from(err: ndarray::ShapeError) -> Self {
        ExplainError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExplainError::ValidationError("feature_names length must match X columns".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: feature_names length must match X columns"
        );
    }

    #[test]
    fn test_shape_error_display() {
        let err = ExplainError::shape("n_features", 3, 2);
        assert_eq!(err.to_string(), "Invalid shape: expected n_features = 3, got 2");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExplainError = io_err.into();
        assert!(matches!(err, ExplainError::IoError(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ExplainError = json_err.into();
        assert!(matches!(err, ExplainError::SerializationError(_)));
    }
}
