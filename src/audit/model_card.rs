//! Model card generation
//!
//! Renders the explainability model card: model type, intended use, data
//! summary, evaluation notes, top global features and limitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Explainability model card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCard {
    pub title: String,
    pub model_type: String,
    pub intended_use: String,
    pub data_summary: String,
    pub evaluation: String,
    /// Feature names ranked by global importance
    pub top_features: Vec<String>,
    pub limitations: String,
    pub notes: Option<String>,
    /// When this card was generated
    pub generated_at: DateTime<Utc>,
}

impl ModelCard {
    /// Card with the standard explainability wording
    pub fn generate(
        model_name: &str,
        model_type: &str,
        n_rows: usize,
        n_cols: usize,
        top_features: Vec<String>,
    ) -> Self {
        Self {
            title: format!("{} - Explainability Model Card", model_name),
            model_type: model_type.to_string(),
            intended_use: "Explain tabular risk and scoring models with audit-ready artifacts for governance and review.".to_string(),
            data_summary: format!(
                "Rows: {}, Columns: {}. Missing values are summarized in artifacts.",
                n_rows, n_cols
            ),
            evaluation: "Provide evaluation metrics (AUC/F1/RMSE) from your training pipeline. This framework records explainability artifacts; it does not enforce a single metric.".to_string(),
            top_features,
            limitations: "Permutation and what-if local explanations are approximations; validate with domain review and stability monitoring.".to_string(),
            notes: Some("This bundle is designed to be stored with model runs to support traceability.".to_string()),
            generated_at: Utc::now(),
        }
    }

    /// Replace the notes section
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Render the model card as Markdown
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.title));
        md.push_str(&format!("*Generated: {}*\n\n", self.generated_at.format("%Y-%m-%d %H:%M UTC")));

        md.push_str("## Model\n");
        md.push_str(&format!("- **Type:** {}\n\n", self.model_type));

        md.push_str("## Intended Use\n");
        md.push_str(&format!("{}\n\n", self.intended_use));

        md.push_str("## Data Summary\n");
        md.push_str(&format!("{}\n\n", self.data_summary));

        md.push_str("## Evaluation\n");
        md.push_str(&format!("{}\n\n", self.evaluation));

        md.push_str("## Top Features (Global)\n");
        for feature in &self.top_features {
            md.push_str(&format!("- {}\n", feature));
        }
        md.push('\n');

        md.push_str("## Limitations\n");
        md.push_str(&format!("{}\n", self.limitations));

        if let Some(notes) = self.notes.as_deref().filter(|n| !n.is_empty()) {
            md.push_str(&format!("\n## Notes\n{}\n", notes));
        }

        md
    }
}
