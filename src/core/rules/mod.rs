//! Atomic scoring rules.
//!
//! Every rule maps the candidate list to a score vector aligned with it.
//! Rules are pure functions of normalized data plus the shared
//! [`ScoringConfig`]; the set is closed and dispatched through [`Rule`].
//! Missing requester or candidate signal yields the rule's base score.

pub mod availability;
pub mod communication;
pub mod education;
pub mod experience;
pub mod grade;
pub mod location;
pub mod network;
pub mod overlap;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::features::FeatureRow;
use crate::core::scoring_config::ScoringConfig;
use crate::models::RequesterContext;

/// Errors raised inside a single rule; always recovered by the caller
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("invalid parameter {name}={value} for rule {rule}")]
    InvalidParameter {
        rule: &'static str,
        name: &'static str,
        value: f64,
    },

    #[error("rule {rule} produced a non-finite score at index {index}")]
    NonFinite { rule: &'static str, index: usize },

    #[error("composite {intent} failed: {reason}")]
    Composite { intent: &'static str, reason: String },
}

/// Per-use overrides for a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    pub base_score: Option<f64>,
    /// Internal blend weight, only read by the overlap rules
    pub weight: Option<f64>,
}

impl RuleParams {
    pub fn with_base(base_score: f64) -> Self {
        Self {
            base_score: Some(base_score),
            weight: None,
        }
    }

    fn validate(&self, rule: Rule) -> Result<(), RuleError> {
        let checks = [("base_score", self.base_score), ("weight", self.weight)];
        for (name, value) in checks {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    return Err(RuleError::InvalidParameter {
                        rule: rule.name(),
                        name,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Score vector positionally aligned with the candidate list
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult(Vec<f64>);

impl RuleResult {
    pub fn new(scores: Vec<f64>) -> Self {
        Self(scores)
    }

    /// Every candidate gets the same score
    pub fn uniform(len: usize, score: f64) -> Self {
        Self(vec![score; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn scores(&self) -> &[f64] {
        &self.0
    }

    pub fn into_scores(self) -> Vec<f64> {
        self.0
    }

    /// Resize to `expected` entries.
    ///
    /// Longer results are truncated. Shorter results are padded by repeating
    /// the last value, or `fallback` when the result is empty.
    pub fn repair(mut self, expected: usize, fallback: f64) -> Self {
        if self.0.len() == expected {
            return self;
        }

        tracing::warn!(
            actual = self.0.len(),
            expected,
            "Rule result length mismatch, repairing"
        );

        if self.0.len() > expected {
            self.0.truncate(expected);
        } else {
            let pad = self.0.last().copied().unwrap_or(fallback);
            self.0.resize(expected, pad);
        }
        self
    }
}

/// The closed set of atomic rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Location,
    Grade,
    Skill,
    Language,
    Expertise,
    NetworkQuality,
    ProjectExperience,
    Education,
    Availability,
    CommunicationStyle,
}

impl Rule {
    pub const ALL: [Rule; 10] = [
        Rule::Location,
        Rule::Grade,
        Rule::Skill,
        Rule::Language,
        Rule::Expertise,
        Rule::NetworkQuality,
        Rule::ProjectExperience,
        Rule::Education,
        Rule::Availability,
        Rule::CommunicationStyle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::Location => "location",
            Rule::Grade => "grade",
            Rule::Skill => "skill",
            Rule::Language => "language",
            Rule::Expertise => "expertise",
            Rule::NetworkQuality => "network_quality",
            Rule::ProjectExperience => "project_experience",
            Rule::Education => "education",
            Rule::Availability => "availability",
            Rule::CommunicationStyle => "communication_style",
        }
    }

    /// Configured base score, after any per-use override
    pub fn base_score(self, params: &RuleParams, config: &ScoringConfig) -> f64 {
        params.base_score.unwrap_or(match self {
            Rule::Location => config.location.base_score,
            Rule::Grade => config.grade.base_score,
            Rule::Skill | Rule::Language | Rule::Expertise => config.overlap.base_score,
            Rule::NetworkQuality => config.network.base_score,
            Rule::ProjectExperience => config.project.base_score,
            Rule::Education => config.education.base_score,
            Rule::Availability => config.availability.base_score,
            Rule::CommunicationStyle => config.communication.base_score,
        })
    }

    pub fn apply(
        self,
        candidates: &[FeatureRow],
        requester: &RequesterContext,
        params: &RuleParams,
        config: &ScoringConfig,
    ) -> Result<RuleResult, RuleError> {
        params.validate(self)?;
        let base = self.base_score(params, config);

        let scores = match self {
            Rule::Location => location::score(candidates, requester, base, &config.location),
            Rule::Grade => grade::score(candidates, requester, base, &config.grade),
            Rule::Skill | Rule::Language | Rule::Expertise => {
                let weight = params.weight.unwrap_or(config.overlap.weight);
                overlap::score(self, candidates, requester, base, weight, &config.overlap)
            }
            Rule::NetworkQuality => network::score(candidates, requester, base, &config.network),
            Rule::ProjectExperience => {
                experience::score(candidates, requester, base, &config.project)
            }
            Rule::Education => education::score(candidates, requester, base, &config.education),
            Rule::Availability => {
                availability::score(candidates, requester, base, &config.availability)
            }
            Rule::CommunicationStyle => {
                communication::score(candidates, requester, base, &config.communication)
            }
        };

        if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
            return Err(RuleError::NonFinite {
                rule: self.name(),
                index,
            });
        }

        Ok(RuleResult::new(scores))
    }
}

/// Name → rule lookup table, built once and shared
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    by_name: HashMap<String, Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        let mut by_name: HashMap<String, Rule> =
            Rule::ALL.iter().map(|r| (r.name().to_string(), *r)).collect();

        // Names used by older preset files
        for (alias, rule) in [
            ("skills", Rule::Skill),
            ("languages", Rule::Language),
            ("expertise_area", Rule::Expertise),
            ("network", Rule::NetworkQuality),
            ("projects", Rule::ProjectExperience),
            ("communication", Rule::CommunicationStyle),
        ] {
            by_name.insert(alias.to_string(), rule);
        }

        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<Rule> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp into [0, 1]
#[inline]
pub(crate) fn unit(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::{CandidateRecord, RequesterContext};

    #[test]
    fn test_repair_truncates_and_pads() {
        let long = RuleResult::new(vec![0.1, 0.2, 0.3]).repair(2, 0.5);
        assert_eq!(long.scores(), &[0.1, 0.2]);

        let short = RuleResult::new(vec![0.1, 0.7]).repair(4, 0.5);
        assert_eq!(short.scores(), &[0.1, 0.7, 0.7, 0.7]);

        let empty = RuleResult::new(vec![]).repair(2, 0.5);
        assert_eq!(empty.scores(), &[0.5, 0.5]);
    }

    #[test]
    fn test_every_rule_returns_one_score_per_candidate() {
        let config = ScoringConfig::default();
        let requester = RequesterContext {
            profile: CandidateRecord {
                skills: strings(&["rust"]),
                ..record("me")
            },
            ..Default::default()
        };
        let candidates = rows(&requester, vec![record("a"), record("b"), record("c")]);

        for rule in Rule::ALL {
            let result = rule
                .apply(&candidates, &requester, &RuleParams::default(), &config)
                .unwrap();
            assert_eq!(result.len(), 3, "rule {}", rule.name());
            assert!(result.scores().iter().all(|s| (0.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn test_no_requester_signal_yields_base_score() {
        let config = ScoringConfig::default();
        let requester = RequesterContext::default();
        let candidate = CandidateRecord {
            skills: strings(&["rust"]),
            languages: strings(&["english"]),
            expertise_areas: strings(&["development"]),
            grade: Some(crate::models::Grade::Senior),
            ..record("a")
        };
        let candidates = rows(&requester, vec![candidate.clone(), candidate]);

        for rule in [
            Rule::Location,
            Rule::Grade,
            Rule::Skill,
            Rule::Language,
            Rule::Expertise,
            Rule::ProjectExperience,
            Rule::Availability,
            Rule::CommunicationStyle,
            Rule::NetworkQuality,
            Rule::Education,
        ] {
            let params = RuleParams::default();
            let base = rule.base_score(&params, &config);
            let result = rule.apply(&candidates, &requester, &params, &config).unwrap();
            assert!(
                result.scores().iter().all(|s| *s == base),
                "rule {} ignored its base score",
                rule.name()
            );
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = ScoringConfig::default();
        let requester = RequesterContext::default();
        let err = Rule::Skill
            .apply(&[], &requester, &RuleParams { base_score: Some(1.5), weight: None }, &config)
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidParameter { name: "base_score", .. }));
    }

    #[test]
    fn test_registry_aliases() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.get("Skills"), Some(Rule::Skill));
        assert_eq!(registry.get("network_quality"), Some(Rule::NetworkQuality));
        assert_eq!(registry.get("horoscope"), None);
    }
}
