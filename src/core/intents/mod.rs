//! Intent composite rules.
//!
//! Exactly one composite exists per supported [`IntentType`]. A composite
//! starts from its own base score, folds in a handful of atomic rules with
//! intent-specific weights, then applies categorical boosts, penalties and
//! a good-match floor. Unknown intents are passed through untouched.

mod interview;
mod mentoring;
mod networking;
mod projects;
mod referral;

use std::cmp::Ordering;

use crate::core::features::FeatureRow;
use crate::core::rules::{overlap, unit, Rule, RuleError, RuleParams, RuleResult};
use crate::core::scoring_config::{Combine, CompositeConfig, IntentsConfig, ScoringConfig};
use crate::models::{IntentType, RequesterContext};

/// `score + (rule_score - 0.5) * weight`, clamped to [0, 1]
#[inline]
pub fn impact(score: f64, rule_score: f64, weight: f64) -> f64 {
    unit(score + (rule_score - 0.5) * weight)
}

/// `(1 - weight) * score + weight * rule_score`
#[inline]
pub fn blend(score: f64, rule_score: f64, weight: f64) -> f64 {
    (1.0 - weight) * score + weight * rule_score
}

/// Per-candidate view handed to the intent-specific adjustments
pub(crate) struct Candidate<'a> {
    pub row: &'a FeatureRow,
    pub requester: &'a RequesterContext,
    pub composite: &'a CompositeConfig,
    pub intents: &'a IntentsConfig,
}

impl Candidate<'_> {
    /// Candidate grade compared to the requester's, when both are known
    pub fn grade_relation(&self) -> Option<Ordering> {
        match (self.row.candidate.grade, self.requester.profile.grade) {
            (Some(candidate), Some(requester)) => Some(candidate.cmp(&requester)),
            _ => None,
        }
    }

    pub fn ratio(&self, rule: Rule) -> f64 {
        overlap::ratio_for(rule, self.requester, &self.row.candidate).unwrap_or(0.0)
    }

    /// Overlap on `rule` is high enough for the composite floor
    pub fn qualifies(&self, rule: Rule) -> bool {
        self.ratio(rule) >= self.intents.qualifying_ratio
    }

    pub fn title_contains_any(&self, keywords: &[String]) -> bool {
        self.row
            .candidate
            .current_title()
            .map(|title| keywords.iter().any(|k| title.contains(k.as_str())))
            .unwrap_or(false)
    }

    pub fn floor(&self, score: f64) -> f64 {
        score.max(self.composite.floor)
    }
}

type Adjust = fn(&Candidate<'_>, f64) -> f64;

fn select(intent: IntentType, intents: &IntentsConfig) -> Option<(&CompositeConfig, Adjust)> {
    let selected: (&CompositeConfig, Adjust) = match intent {
        IntentType::MockInterview => (&intents.mock_interview, interview::adjust),
        IntentType::MentoringMentor => (&intents.mentoring_mentor, mentoring::adjust_mentor),
        IntentType::MentoringMentee => (&intents.mentoring_mentee, mentoring::adjust_mentee),
        IntentType::ProjectContributor => {
            (&intents.project_contributor, projects::adjust_contributor)
        }
        IntentType::FindCofounder => (&intents.find_cofounder, projects::adjust_cofounder),
        IntentType::PetProject => (&intents.pet_project, projects::adjust_pet_project),
        IntentType::Referral => (&intents.referral, referral::adjust),
        IntentType::ProfessionalNetworking => {
            (&intents.professional_networking, networking::adjust_professional)
        }
        IntentType::SocialExpansion => (&intents.social_expansion, networking::adjust_social),
        IntentType::Unknown => return None,
    };
    Some(selected)
}

/// Score every candidate with the requester's intent composite.
///
/// Returns `Ok(None)` for intents without a composite. A failing component
/// rule is logged and skipped; the composite itself only errors when it
/// produces non-finite scores.
pub fn evaluate(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    config: &ScoringConfig,
) -> Result<Option<RuleResult>, RuleError> {
    let intent = requester.intent;
    let Some((composite, adjust)) = select(intent, &config.intents) else {
        tracing::debug!(
            intent = intent.as_str(),
            "No composite for intent, passing scores through"
        );
        return Ok(None);
    };

    let n = candidates.len();
    let mut scores = vec![composite.base_score; n];

    for component in &composite.components {
        let params = RuleParams::default();
        let fallback = component.rule.base_score(&params, config);
        let result = match component.rule.apply(candidates, requester, &params, config) {
            Ok(result) => result.repair(n, fallback),
            Err(e) => {
                tracing::warn!(
                    intent = intent.as_str(),
                    rule = component.rule.name(),
                    error = %e,
                    "Composite component failed, skipping its contribution"
                );
                continue;
            }
        };

        for (score, rule_score) in scores.iter_mut().zip(result.scores()) {
            *score = match component.combine {
                Combine::Impact => impact(*score, *rule_score, component.weight),
                Combine::Blend => blend(*score, *rule_score, component.weight),
            };
        }
    }

    for (score, row) in scores.iter_mut().zip(candidates) {
        let candidate = Candidate {
            row,
            requester,
            composite,
            intents: &config.intents,
        };
        *score = unit(adjust(&candidate, *score));
    }

    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(RuleError::Composite {
            intent: intent.as_str(),
            reason: format!("non-finite score at index {}", index),
        });
    }

    Ok(Some(RuleResult::new(scores)))
}
