use super::Candidate;

/// Referrals hinge on working at the company the requester is targeting
pub(super) fn adjust(c: &Candidate<'_>, score: f64) -> f64 {
    let mut score = score;

    let target = c.requester.content_str("target_company");
    let works_there = match (&target, c.row.candidate.current_company()) {
        (Some(target), Some(company)) => company == target.as_str(),
        _ => false,
    };

    if works_there {
        score += c.composite.boost;
    }
    if c.row.candidate.grade.is_some_and(|g| g.is_senior_or_above()) {
        score += c.composite.secondary_boost;
    }

    if works_there {
        score = c.floor(score);
    }
    score
}
