//! Kolosal Explain - explainability and audit artifacts for tabular models
//!
//! Given any model that can score a feature matrix, this crate produces:
//! - Global permutation feature importance
//! - Local what-if contributions for a single row
//! - Ranked, human-readable reason codes
//! - Population stability index (PSI) per feature
//! - A JSON explanation bundle and a Markdown model card
//!
//! # Modules
//!
//! - [`model`] - The `Model` capability and closure adapter
//! - [`models`] - Fixed-coefficient linear and logistic adapters
//! - [`explainability`] - Permutation importance and what-if explanations
//! - [`reason_codes`] - Reason code generation from contributions
//! - [`drift`] - Population stability index
//! - [`audit`] - Explanation bundle and model card
//! - [`pipeline`] - Orchestrates one run over a dataset
//! - [`data`] - CSV loading and column statistics
//! - [`cli`] - Command-line interface

pub mod error;
pub mod config;

pub mod model;
pub mod models;
pub mod data;

pub mod explainability;
pub mod reason_codes;
pub mod drift;
pub mod audit;
pub mod pipeline;

pub(crate) mod serde_float;

pub mod cli;

pub use error::{ExplainError, Result};

/// Prelude for common imports
pub mod prelude {
    pub use crate::audit::{ExplanationBundle, ModelCard};
    pub use crate::config::{ExplainConfig, TaskType};
    pub use crate::drift::{compute_psi, DriftDetector, PopulationStabilityIndex, PsiSeverity};
    pub use crate::error::{ExplainError, Result};
    pub use crate::explainability::{
        Explainer, FeatureScores, GlobalExplanation, LocalExplanation, PermutationExplainer,
    };
    pub use crate::model::{Model, PredictFn};
    pub use crate::models::{LinearModel, LogisticModel, ModelSpec};
    pub use crate::pipeline::ExplainablePipeline;
    pub use crate::reason_codes::{ReasonCode, ReasonCodeGenerator, ReasonTemplate, ReasonTemplates};
}
