use super::unit;
use crate::core::features::FeatureRow;
use crate::core::scoring_config::EducationConfig;
use crate::models::{Education, RequesterContext};

pub fn education_score(
    entries: &[Education],
    reference_fields: &[&str],
    base: f64,
    config: &EducationConfig,
) -> f64 {
    if entries.is_empty() {
        return base;
    }

    let mut score = base + config.has_education_bonus;

    let degrees: Vec<&str> = entries.iter().filter_map(|e| e.degree.as_deref()).collect();
    if !degrees.is_empty() {
        score += config.degree_bonus;
    }
    let advanced = degrees.iter().any(|d| {
        config
            .advanced_degree_keywords
            .iter()
            .any(|k| d.contains(k.as_str()))
    });
    if advanced {
        score += config.advanced_degree_bonus;
    }

    let field_match = entries
        .iter()
        .filter_map(|e| e.field_of_study.as_deref())
        .any(|field| reference_fields.iter().any(|r| field.contains(r)));
    if field_match {
        score += config.field_match_bonus;
    }

    unit(score)
}

/// Candidate education; the field bonus looks at the requester's expertise.
/// A requester without expertise gives every candidate the base score.
pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &EducationConfig,
) -> Vec<f64> {
    if requester.profile.expertise_areas.is_empty() {
        return vec![base; candidates.len()];
    }

    let reference: Vec<&str> = requester
        .profile
        .expertise_areas
        .iter()
        .map(String::as_str)
        .collect();

    candidates
        .iter()
        .map(|row| {
            let entries = row
                .candidate
                .external
                .as_ref()
                .map(|e| e.education.as_slice())
                .unwrap_or_default();
            education_score(entries, &reference, base, config)
        })
        .collect()
}
