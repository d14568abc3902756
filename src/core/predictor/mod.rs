//! Candidate scoring behind one `predict(candidates) -> scores` contract.
//!
//! Two implementations exist: a rule-based [`HeuristicPredictor`] and a
//! [`GradientBoostedPredictor`] that evaluates an externally trained tree
//! ensemble. Which one a request uses is fixed by its settings preset.

pub mod boosted;
pub mod heuristic;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::features::FeatureRow;

pub use boosted::{GradientBoostedPredictor, FEATURE_NAMES};
pub use heuristic::{HeuristicPredictor, RuleSpec};

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("predictor {0} used before a model was loaded")]
    NotLoaded(&'static str),

    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("predictor {predictor} returned {got} scores for {expected} candidates")]
    ShapeMismatch {
        predictor: &'static str,
        expected: usize,
        got: usize,
    },
}

impl PredictorError {
    /// Misuse or a bad artifact, as opposed to a runtime failure
    pub fn is_configuration(&self) -> bool {
        !matches!(self, PredictorError::Io { .. } | PredictorError::ShapeMismatch { .. })
    }
}

/// Scores candidates; one score per row, aligned with the input
pub trait Predictor: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether `predict` can run at all; checked before any data is loaded
    fn is_ready(&self) -> bool {
        true
    }

    fn predict(&self, candidates: &[FeatureRow]) -> Result<Vec<f64>, PredictorError>;
}

/// Predictor choice as declared by a settings preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictorKind {
    #[default]
    Heuristic,
    GradientBoosted { model_ref: String },
}

