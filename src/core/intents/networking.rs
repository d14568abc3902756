use super::Candidate;
use crate::core::rules::Rule;
use crate::models::Grade;

/// Professional networking rewards experienced people in the same field
pub(super) fn adjust_professional(c: &Candidate<'_>, score: f64) -> f64 {
    let mut score = score;
    let same_field = c.ratio(Rule::Expertise) > 0.0;

    if same_field {
        match c.row.candidate.grade {
            Some(g) if g >= Grade::Senior => score += c.composite.boost,
            Some(Grade::Middle) => score += c.composite.secondary_boost,
            _ => {}
        }
    }

    if c.qualifies(Rule::Expertise) {
        score = c.floor(score);
    }
    score
}

/// Social expansion: mild bonus for shared industries, no floor
pub(super) fn adjust_social(c: &Candidate<'_>, score: f64) -> f64 {
    let shared_industry = c
        .requester
        .profile
        .industries
        .iter()
        .any(|i| c.row.candidate.industries.contains(i));

    if shared_industry {
        score + c.composite.boost
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use crate::core::intents::evaluate;
    use crate::core::intents::tests::{candidate, requester};
    use crate::core::rules::test_support::{rows, strings};
    use crate::core::scoring_config::ScoringConfig;
    use crate::models::{CandidateRecord, Grade, IntentType};

    #[test]
    fn test_lead_outranks_middle_in_same_field() {
        let config = ScoringConfig::default();
        let req = requester(IntentType::ProfessionalNetworking, Grade::Middle, &["development"]);
        let candidates = rows(
            &req,
            vec![
                candidate("middle", Grade::Middle, &["development"]),
                candidate("lead", Grade::Lead, &["development"]),
            ],
        );

        let scores = evaluate(&candidates, &req, &config).unwrap().unwrap().into_scores();
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn test_social_expansion_ignores_floor() {
        let mut config = ScoringConfig::default();
        config.intents.social_expansion.floor = 0.95;

        let mut req = requester(IntentType::SocialExpansion, Grade::Middle, &["development"]);
        req.profile.industries = strings(&["fintech"]);
        let shared = CandidateRecord {
            industries: strings(&["fintech"]),
            ..candidate("shared", Grade::Middle, &["design"])
        };
        let other = candidate("other", Grade::Middle, &["design"]);

        let scores = evaluate(&rows(&req, vec![shared, other]), &req, &config)
            .unwrap()
            .unwrap()
            .into_scores();
        assert!(scores[0] > scores[1]);
        assert!(scores.iter().all(|s| *s < 0.95));
    }
}
