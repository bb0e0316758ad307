//! Drift detection module
//!
//! Population stability index (PSI) between a reference dataset and a
//! comparison dataset, per feature.
//!
//! PSI has no universal pass/fail line. The conventional reading is:
//! - `< 0.1`: stable
//! - `0.1 ..< 0.25`: moderate shift, worth a look
//! - `>= 0.25`: severe shift
//!
//! [`compute_psi`] returns raw scores; [`PsiSeverity`] applies the
//! conventional thresholds for callers that want a label.

mod psi;

pub use psi::{compute_psi, PopulationStabilityIndex, PSI_EPSILON};

use crate::error::Result;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Conventional threshold for a moderate shift
pub const PSI_MODERATE: f64 = 0.1;

/// Conventional threshold for a severe shift
pub const PSI_SEVERE: f64 = 0.25;

/// Severity band of a PSI score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsiSeverity {
    Stable,
    Moderate,
    Severe,
}

impl PsiSeverity {
    /// Classify a score with the conventional thresholds
    pub fn classify(psi: f64) -> Self {
        Self::classify_with(psi, PSI_MODERATE, PSI_SEVERE)
    }

    /// Classify a score with custom thresholds
    pub fn classify_with(psi: f64, moderate: f64, severe: f64) -> Self {
        if psi >= severe {
            PsiSeverity::Severe
        } else if psi >= moderate {
            PsiSeverity::Moderate
        } else {
            PsiSeverity::Stable
        }
    }
}

impl std::fmt::Display for PsiSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PsiSeverity::Stable => write!(f, "stable"),
            PsiSeverity::Moderate => write!(f, "moderate"),
            PsiSeverity::Severe => write!(f, "severe"),
        }
    }
}

/// Drift detection result for one feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftResult {
    /// Whether drift was detected
    pub drift_detected: bool,
    /// Drift score
    pub score: f64,
    /// Threshold that was crossed (or the lowest one, when none was)
    pub threshold: f64,
    /// Severity band
    pub severity: PsiSeverity,
    /// Additional information
    pub message: String,
}

impl DriftResult {
    /// Create a result indicating no drift
    pub fn no_drift(score: f64, threshold: f64) -> Self {
        Self {
            drift_detected: false,
            score,
            threshold,
            severity: PsiSeverity::Stable,
            message: "No drift detected".to_string(),
        }
    }

    /// Create a result indicating drift
    pub fn drift(score: f64, threshold: f64, severity: PsiSeverity, message: &str) -> Self {
        Self {
            drift_detected: true,
            score,
            threshold,
            severity,
            message: message.to_string(),
        }
    }
}

/// Trait for single-column drift detectors
pub trait DriftDetector: Send + Sync {
    /// Detect drift between reference and comparison values of one feature
    fn detect(&self, reference: ArrayView1<f64>, comparison: ArrayView1<f64>) -> Result<DriftResult>;

    /// Lowest threshold at which drift is reported
    fn threshold(&self) -> f64;
}
