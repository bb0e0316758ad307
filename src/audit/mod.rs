//! Audit artifacts
//!
//! The explanation bundle (JSON) and the model card (markdown) are the
//! two artifacts a pipeline run produces. Both serialize to plain
//! primitives and can be stored alongside a model run.

mod bundle;
mod model_card;

pub use bundle::{
    DataSummary, ExplanationBundle, GlobalExplanations, LocalExplanations, ModelMetadata,
    StabilityReport,
};
pub use model_card::ModelCard;
