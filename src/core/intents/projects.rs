use super::Candidate;
use crate::core::rules::Rule;
use crate::models::Grade;

/// Contributors: anyone with the stack, a nudge for middle and up
pub(super) fn adjust_contributor(c: &Candidate<'_>, score: f64) -> f64 {
    let mut score = score;
    if c.row.candidate.grade.is_some_and(|g| g >= Grade::Middle) {
        score += c.composite.boost;
    }
    if c.qualifies(Rule::Skill) {
        score = c.floor(score);
    }
    score
}

/// Cofounders: founder-type titles first, then plain seniority
pub(super) fn adjust_cofounder(c: &Candidate<'_>, score: f64) -> f64 {
    let mut score = score;
    let founder = c.title_contains_any(&c.intents.founder_keywords);
    if founder {
        score += c.composite.boost;
    }

    if !founder && c.row.candidate.grade.is_some_and(|g| g.is_senior_or_above()) {
        score += c.composite.secondary_boost;
    }

    if founder && c.qualifies(Rule::Expertise) {
        score = c.floor(score);
    }
    score
}

/// Pet projects skew towards people still growing
pub(super) fn adjust_pet_project(c: &Candidate<'_>, score: f64) -> f64 {
    let mut score = score;
    if c.row.candidate.grade.is_some_and(|g| g <= Grade::Middle) {
        score += c.composite.boost;
    }
    if c.qualifies(Rule::Skill) {
        score = c.floor(score);
    }
    score
}
