use std::cmp::Ordering;

use super::Candidate;
use crate::core::rules::Rule;

/// Requester looks for a mentor: more senior candidates with the same expertise
pub(super) fn adjust_mentor(c: &Candidate<'_>, score: f64) -> f64 {
    let composite = c.composite;
    let mut score = score;

    match c.grade_relation() {
        Some(Ordering::Greater) => {
            score += composite.boost;
            if c.row.candidate.grade.is_some_and(|g| g.is_senior_or_above()) {
                score += composite.secondary_boost;
            }
        }
        Some(Ordering::Less) => score -= composite.penalty,
        Some(Ordering::Equal) | None => {}
    }

    if c.qualifies(Rule::Expertise) && c.grade_relation() == Some(Ordering::Greater) {
        score = c.floor(score);
    }
    score
}

/// Requester looks for mentees: less senior candidates in the requester's field
pub(super) fn adjust_mentee(c: &Candidate<'_>, score: f64) -> f64 {
    let composite = c.composite;
    let mut score = score;

    match c.grade_relation() {
        Some(Ordering::Less) => score += composite.boost,
        Some(Ordering::Equal) | Some(Ordering::Greater) => score -= composite.penalty,
        None => {}
    }

    if c.qualifies(Rule::Expertise) && c.grade_relation() == Some(Ordering::Less) {
        score = c.floor(score);
    }
    score
}
