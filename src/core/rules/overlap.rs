//! Set-overlap rules: skills, languages and expertise areas.
//!
//! The match ratio is asymmetric: `|requester ∩ candidate| / |requester|`.
//! Both sides are treated as sets, so ordering and duplicates in the
//! input sequences never change the result.

use std::collections::HashSet;

use super::Rule;
use crate::core::features::FeatureRow;
use crate::core::scoring_config::OverlapConfig;
use crate::models::{CandidateRecord, RequesterContext};

/// Share of the requester-side set found in the candidate-side set.
///
/// `None` when the requester side is empty.
pub fn match_ratio<R, C>(requester: &[R], candidate: &[C]) -> Option<f64>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    let wanted: HashSet<&str> = requester.iter().map(AsRef::as_ref).collect();
    if wanted.is_empty() {
        return None;
    }
    let offered: HashSet<&str> = candidate.iter().map(AsRef::as_ref).collect();
    let shared = wanted.intersection(&offered).count();
    Some(shared as f64 / wanted.len() as f64)
}

/// Values the given rule compares, for either side of the match
pub fn values(rule: Rule, record: &CandidateRecord) -> Vec<&str> {
    match rule {
        Rule::Skill => record.all_skills(),
        Rule::Language => record.languages.iter().map(String::as_str).collect(),
        _ => record.expertise_areas.iter().map(String::as_str).collect(),
    }
}

/// Ratio for one candidate under one overlap rule
pub fn ratio_for(
    rule: Rule,
    requester: &RequesterContext,
    candidate: &CandidateRecord,
) -> Option<f64> {
    match_ratio(&values(rule, &requester.profile), &values(rule, candidate))
}

pub fn score(
    rule: Rule,
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    weight: f64,
    config: &OverlapConfig,
) -> Vec<f64> {
    let wanted = values(rule, &requester.profile);
    if wanted.is_empty() {
        return vec![base; candidates.len()];
    }

    candidates
        .iter()
        .map(|row| {
            let offered = values(rule, &row.candidate);
            match match_ratio(&wanted, &offered) {
                Some(ratio) => base * (1.0 - weight) + config.tier_score(ratio) * weight,
                None => base,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::*;

    #[test]
    fn test_ratio_is_requester_denominated() {
        let ratio = match_ratio(&["rust", "go"], &["rust", "python", "java", "c"]).unwrap();
        assert_eq!(ratio, 0.5);

        let reversed = match_ratio(&["rust", "python", "java", "c"], &["rust", "go"]).unwrap();
        assert_eq!(reversed, 0.25);
    }

    #[test]
    fn test_ratio_ignores_order_and_duplicates() {
        let a = match_ratio(&["a", "b", "c"], &["c", "a"]).unwrap();
        let b = match_ratio(&["c", "b", "a", "a"], &["a", "c", "c"]).unwrap();
        assert_eq!(a, b);
        assert!(match_ratio::<&str, &str>(&[], &["a"]).is_none());
    }

    #[test]
    fn test_tiers_blend_with_base() {
        let config = OverlapConfig::default();
        let requester = RequesterContext {
            profile: CandidateRecord {
                skills: strings(&["rust", "go", "sql", "k8s", "aws"]),
                ..record("me")
            },
            ..Default::default()
        };
        let candidates = rows(
            &requester,
            vec![
                CandidateRecord {
                    skills: strings(&["rust", "go", "sql", "k8s", "aws"]),
                    ..record("a")
                },
                CandidateRecord { skills: strings(&["rust", "go", "sql"]), ..record("b") },
                CandidateRecord { skills: strings(&["php"]), ..record("c") },
            ],
        );

        let scores = score(Rule::Skill, &candidates, &requester, 0.3, 0.5, &config);
        assert!((scores[0] - 0.65).abs() < 1e-9);
        assert!((scores[1] - 0.55).abs() < 1e-9);
        assert!((scores[2] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let config = OverlapConfig::default();
        let requester = RequesterContext {
            profile: CandidateRecord { languages: strings(&["english", "german"]), ..record("me") },
            ..Default::default()
        };
        let candidates = rows(
            &requester,
            vec![CandidateRecord { languages: strings(&["german"]), ..record("a") }],
        );

        let first = score(Rule::Language, &candidates, &requester, 0.3, 0.8, &config);
        let second = score(Rule::Language, &candidates, &requester, 0.3, 0.8, &config);
        assert_eq!(first, second);
    }
}
