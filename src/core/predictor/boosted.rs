//! Gradient-boosted tree ensemble loaded from a JSON artifact.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "objective": "binary:logistic",
//!   "base_score": 0.0,
//!   "features": ["skill_ratio", "grade_delta"],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 0, "threshold": 0.5, "yes": 1, "no": 2, "missing": 2 },
//!         { "leaf": -0.4 },
//!         { "leaf": 0.6 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! `features` lists the columns the trees index into; every name must be
//! one of [`FEATURE_NAMES`]. A split sends `x < threshold` to `yes`, the
//! rest to `no`, and missing values (NaN) to `missing` or `no`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Predictor, PredictorError};
use crate::core::features::FeatureRow;
use crate::core::rules::location::{best_tier, LocationTier};
use crate::core::rules::overlap::{match_ratio, ratio_for};
use crate::core::rules::Rule;

/// Feature columns a model artifact may reference
pub const FEATURE_NAMES: [&str; 11] = [
    "skill_ratio",
    "expertise_ratio",
    "language_ratio",
    "industry_ratio",
    "grade_delta",
    "same_city",
    "same_country",
    "followers_log",
    "has_summary",
    "experience_count",
    "education_count",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
    #[serde(rename = "reg:squarederror")]
    SquaredError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf {
        leaf: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        #[serde(default)]
        missing: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        // Children always point forward, so this walk terminates
        loop {
            match &self.nodes[index] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = x[*feature];
                    index = if value.is_nan() {
                        missing.unwrap_or(*no)
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub objective: Objective,
    #[serde(default)]
    pub base_score: f64,
    pub features: Vec<String>,
    pub trees: Vec<Tree>,
}

impl ModelArtifact {
    fn validate(&self) -> Result<(), PredictorError> {
        if self.features.is_empty() {
            return Err(PredictorError::InvalidModel("no features declared".into()));
        }
        if let Some(unknown) = self
            .features
            .iter()
            .find(|f| !FEATURE_NAMES.contains(&f.as_str()))
        {
            return Err(PredictorError::InvalidModel(format!("unknown feature '{}'", unknown)));
        }
        if !self.base_score.is_finite() {
            return Err(PredictorError::InvalidModel("base_score is not finite".into()));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(PredictorError::InvalidModel(format!("tree {} has no nodes", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Leaf { leaf } if !leaf.is_finite() => {
                        return Err(PredictorError::InvalidModel(format!(
                            "tree {} node {} has a non-finite leaf",
                            t, i
                        )));
                    }
                    Node::Leaf { .. } => {}
                    Node::Split {
                        feature,
                        yes,
                        no,
                        missing,
                        ..
                    } => {
                        if *feature >= self.features.len() {
                            return Err(PredictorError::InvalidModel(format!(
                                "tree {} node {} references feature {}",
                                t, i, feature
                            )));
                        }
                        let children = [Some(*yes), Some(*no), *missing];
                        if children
                            .into_iter()
                            .flatten()
                            .any(|c| c <= i || c >= tree.nodes.len())
                        {
                            return Err(PredictorError::InvalidModel(format!(
                                "tree {} node {} has an invalid child reference",
                                t, i
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// A loaded model plus the mapping from its columns to [`FEATURE_NAMES`]
#[derive(Debug, Clone)]
struct LoadedModel {
    artifact: ModelArtifact,
    columns: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct GradientBoostedPredictor {
    model: Option<LoadedModel>,
}

impl GradientBoostedPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read, parse and validate a model artifact from local storage
    pub fn load(&mut self, path: &Path) -> Result<(), PredictorError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PredictorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        self.load_artifact(artifact)?;

        tracing::info!(path = %path.display(), "Loaded gradient boosted model");
        Ok(())
    }

    pub fn load_artifact(&mut self, artifact: ModelArtifact) -> Result<(), PredictorError> {
        artifact.validate()?;

        let columns = artifact
            .features
            .iter()
            .filter_map(|name| FEATURE_NAMES.iter().position(|f| f == name))
            .collect();

        tracing::debug!(
            trees = artifact.trees.len(),
            features = artifact.features.len(),
            "Model artifact validated"
        );
        self.model = Some(LoadedModel { artifact, columns });
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Full feature vector for one row, NaN marking a missing value
pub fn feature_vector(row: &FeatureRow) -> [f64; FEATURE_NAMES.len()] {
    let requester = row.main.as_ref();
    let candidate = &row.candidate;
    let ratio = |rule| ratio_for(rule, requester, candidate).unwrap_or(f64::NAN);

    let grade_delta = match (candidate.grade, requester.profile.grade) {
        (Some(c), Some(r)) => c.index() as f64 - r.index() as f64,
        _ => f64::NAN,
    };

    let (same_city, same_country) = match requester.profile.location.as_ref() {
        Some(reference) if !candidate.location_signals().is_empty() => {
            let tier = best_tier(reference, row);
            (flag(tier == LocationTier::City), flag(tier >= LocationTier::Country))
        }
        _ => (f64::NAN, f64::NAN),
    };

    let external = candidate.external.as_ref();

    [
        ratio(Rule::Skill),
        ratio(Rule::Expertise),
        ratio(Rule::Language),
        match_ratio(&requester.profile.industries, &candidate.industries).unwrap_or(f64::NAN),
        grade_delta,
        same_city,
        same_country,
        external.map_or(f64::NAN, |p| (p.follower_count as f64).ln_1p()),
        external.map_or(f64::NAN, |p| flag(p.summary.is_some())),
        external.map_or(0.0, |p| p.work_history.len() as f64),
        external.map_or(0.0, |p| p.education.len() as f64),
    ]
}

impl Predictor for GradientBoostedPredictor {
    fn name(&self) -> &'static str {
        "gradient_boosted"
    }

    fn is_ready(&self) -> bool {
        self.is_loaded()
    }

    fn predict(&self, candidates: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        let model = self.model.as_ref().ok_or(PredictorError::NotLoaded("gradient_boosted"))?;
        let artifact = &model.artifact;

        let mut x = vec![0.0; model.columns.len()];
        let scores = candidates
            .iter()
            .map(|row| {
                let full = feature_vector(row);
                for (slot, column) in x.iter_mut().zip(&model.columns) {
                    *slot = full[*column];
                }

                let margin = artifact.base_score
                    + artifact.trees.iter().map(|t| t.evaluate(&x)).sum::<f64>();
                let score = match artifact.objective {
                    Objective::BinaryLogistic => 1.0 / (1.0 + (-margin).exp()),
                    Objective::SquaredError => margin,
                };
                if score.is_finite() {
                    score.clamp(0.0, 1.0)
                } else {
                    0.0
                }
            })
            .collect();

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::*;
    use crate::models::{CandidateRecord, RequesterContext};
    use std::io::Write;

    fn artifact() -> ModelArtifact {
        serde_json::from_str(
            r#"{
                "objective": "binary:logistic",
                "base_score": 0.0,
                "features": ["skill_ratio"],
                "trees": [
                    { "nodes": [
                        { "feature": 0, "threshold": 0.5, "yes": 1, "no": 2, "missing": 1 },
                        { "leaf": -1.0 },
                        { "leaf": 1.0 }
                    ] }
                ]
            }"#,
        )
        .unwrap()
    }

    fn requester() -> RequesterContext {
        RequesterContext {
            profile: CandidateRecord {
                skills: strings(&["rust", "sql"]),
                ..record("me")
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_predict_before_load_fails() {
        let predictor = GradientBoostedPredictor::new();
        let err = predictor.predict(&[]).unwrap_err();
        assert!(matches!(err, PredictorError::NotLoaded(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ready_only_after_load() {
        let mut predictor = GradientBoostedPredictor::new();
        assert!(!predictor.is_ready());
        predictor.load_artifact(artifact()).unwrap();
        assert!(predictor.is_ready());
    }

    #[test]
    fn test_tree_splits_on_skill_ratio() {
        let mut predictor = GradientBoostedPredictor::new();
        predictor.load_artifact(artifact()).unwrap();

        let req = requester();
        let candidates = rows(
            &req,
            vec![
                CandidateRecord { skills: strings(&["rust", "sql"]), ..record("full") },
                CandidateRecord { skills: strings(&["go"]), ..record("none") },
            ],
        );

        let scores = predictor.predict(&candidates).unwrap();
        assert!((scores[0] - 1.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-9);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_missing_value_takes_missing_branch() {
        let mut predictor = GradientBoostedPredictor::new();
        predictor.load_artifact(artifact()).unwrap();

        // Requester without skills makes skill_ratio missing
        let req = RequesterContext { profile: record("me"), ..Default::default() };
        let scores = predictor.predict(&rows(&req, vec![record("a")])).unwrap();
        assert!(scores[0] < 0.5);
    }

    #[test]
    fn test_rejects_unknown_feature() {
        let mut bad = artifact();
        bad.features = vec!["shoe_size".into()];
        let err = GradientBoostedPredictor::new().load_artifact(bad).unwrap_err();
        assert!(matches!(err, PredictorError::InvalidModel(_)));
    }

    #[test]
    fn test_rejects_backward_child_reference() {
        let mut bad = artifact();
        bad.trees[0].nodes[0] = Node::Split {
            feature: 0,
            threshold: 0.5,
            yes: 0,
            no: 2,
            missing: None,
        };
        assert!(GradientBoostedPredictor::new().load_artifact(bad).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&artifact()).unwrap().as_bytes()).unwrap();

        let mut predictor = GradientBoostedPredictor::new();
        predictor.load(file.path()).unwrap();
        assert!(predictor.is_loaded());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let mut predictor = GradientBoostedPredictor::new();
        let err = predictor.load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, PredictorError::Io { .. }));
    }
}
