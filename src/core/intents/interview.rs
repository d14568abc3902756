use std::cmp::Ordering;

use super::Candidate;
use crate::core::rules::Rule;

/// Mock interviews want an interviewer at or above the requester's level
pub(super) fn adjust(c: &Candidate<'_>, score: f64) -> f64 {
    let relation = c.grade_relation();
    let score = match relation {
        Some(Ordering::Greater) | Some(Ordering::Equal) => score + c.composite.boost,
        Some(Ordering::Less) => score - c.composite.penalty,
        None => score,
    };

    let relevant = c.qualifies(Rule::Skill) || c.qualifies(Rule::Expertise);
    if relevant && matches!(relation, Some(Ordering::Greater) | Some(Ordering::Equal)) {
        c.floor(score)
    } else {
        score
    }
}
