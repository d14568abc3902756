use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Predictor, PredictorError};
use crate::core::features::FeatureRow;
use crate::core::intents;
use crate::core::rules::location::{best_tier, LocationTier};
use crate::core::rules::{Rule, RuleParams};
use crate::core::scoring_config::{FinalPassConfig, ScoringConfig};
use crate::models::{IntentType, RequesterContext};

/// Neutral starting point before any rule has run
const INITIAL_SCORE: f64 = 0.5;

/// One entry of the ordered base-rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub rule: Rule,
    /// Running blend weight: `score = (1 - w) * score + w * rule_score`
    pub weight: f64,
    #[serde(default)]
    pub params: RuleParams,
}

impl RuleSpec {
    pub fn new(rule: Rule, weight: f64) -> Self {
        Self {
            rule,
            weight,
            params: RuleParams::default(),
        }
    }
}

/// Rule library + intent composite + cross-cutting final pass
#[derive(Debug, Clone)]
pub struct HeuristicPredictor {
    config: Arc<ScoringConfig>,
    rules: Vec<RuleSpec>,
}

impl HeuristicPredictor {
    pub fn new(config: Arc<ScoringConfig>, rules: Vec<RuleSpec>) -> Self {
        Self { config, rules }
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    fn apply_base_rules(
        &self,
        candidates: &[FeatureRow],
        requester: &RequesterContext,
        scores: &mut [f64],
    ) {
        let n = candidates.len();
        for spec in &self.rules {
            let fallback = spec.rule.base_score(&spec.params, &self.config);
            match spec.rule.apply(candidates, requester, &spec.params, &self.config) {
                Ok(result) => {
                    let result = result.repair(n, fallback);
                    let w = spec.weight.clamp(0.0, 1.0);
                    for (score, rule_score) in scores.iter_mut().zip(result.scores()) {
                        *score = (1.0 - w) * *score + w * rule_score;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        rule = spec.rule.name(),
                        error = %e,
                        "Rule failed, leaving scores unchanged"
                    );
                }
            }
        }
    }

    fn apply_intent(
        &self,
        candidates: &[FeatureRow],
        requester: &RequesterContext,
        scores: &mut [f64],
    ) {
        match intents::evaluate(candidates, requester, &self.config) {
            Ok(Some(result)) => {
                let result = result.repair(candidates.len(), INITIAL_SCORE);
                let w = self.config.intents.blend_weight;
                for (score, intent_score) in scores.iter_mut().zip(result.scores()) {
                    *score = (1.0 - w) * *score + w * intent_score;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    intent = requester.intent.as_str(),
                    error = %e,
                    "Intent composite failed, leaving scores unchanged"
                );
            }
        }
    }
}

/// Bonus for a rich external profile, independent of intent
fn richness_boost(row: &FeatureRow, config: &FinalPassConfig) -> f64 {
    let Some(profile) = &row.candidate.external else {
        return 0.0;
    };

    let mut boost = 0.0;
    if profile.follower_count >= config.follower_threshold {
        boost += config.follower_boost;
    }
    if profile.summary.is_some() {
        boost += config.summary_boost;
    }
    if !profile.skills.is_empty() {
        boost += config.skills_boost;
    }
    if !profile.work_history.is_empty() {
        boost += config.experience_boost;
    }
    boost.min(config.max_richness_boost)
}

/// Adjustment for in-person meetings, based on how close the candidate is
fn offline_adjustment(
    row: &FeatureRow,
    requester: &RequesterContext,
    config: &FinalPassConfig,
) -> f64 {
    if !requester.wants_offline_meeting() {
        return 0.0;
    }
    let Some(reference) = requester.profile.location.as_ref() else {
        return 0.0;
    };

    if row.candidate.location_signals().is_empty() {
        return -config.offline_unknown_penalty;
    }
    match best_tier(reference, row) {
        LocationTier::City => config.offline_same_city_boost,
        LocationTier::Country => config.offline_same_country_boost,
        LocationTier::Region | LocationTier::None => -config.offline_mismatch_penalty,
    }
}

/// Grade floors and ceilings that depend on the intent
fn grade_bounds(
    row: &FeatureRow,
    requester: &RequesterContext,
    score: f64,
    config: &FinalPassConfig,
) -> f64 {
    let (Some(candidate), Some(own)) = (row.candidate.grade, requester.profile.grade) else {
        if requester.intent == IntentType::Referral
            && row.candidate.grade.is_some_and(|g| g.is_senior_or_above())
        {
            return score.max(config.senior_floor);
        }
        return score;
    };

    match requester.intent {
        IntentType::MentoringMentor | IntentType::MockInterview if candidate < own => {
            score.min(config.below_grade_ceiling)
        }
        IntentType::MentoringMentee if candidate >= own => score.min(config.above_grade_ceiling),
        IntentType::Referral if candidate.is_senior_or_above() => score.max(config.senior_floor),
        _ => score,
    }
}

impl Predictor for HeuristicPredictor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn predict(&self, candidates: &[FeatureRow]) -> Result<Vec<f64>, PredictorError> {
        let Some(first) = candidates.first() else {
            return Ok(Vec::new());
        };
        let requester = first.main.as_ref();

        let mut scores = vec![INITIAL_SCORE; candidates.len()];
        self.apply_base_rules(candidates, requester, &mut scores);
        self.apply_intent(candidates, requester, &mut scores);

        let final_pass = &self.config.final_pass;
        for (score, row) in scores.iter_mut().zip(candidates) {
            let mut s = *score
                + richness_boost(row, final_pass)
                + offline_adjustment(row, requester, final_pass);
            s = grade_bounds(row, requester, s, final_pass);
            *score = if s.is_finite() {
                s.clamp(final_pass.min_score, final_pass.max_score)
            } else {
                final_pass.min_score
            };
        }

        tracing::debug!(
            requester_id = requester.user_id(),
            intent = requester.intent.as_str(),
            candidates = candidates.len(),
            "Heuristic scoring finished"
        );

        Ok(scores)
    }
}
