use super::unit;
use crate::core::features::FeatureRow;
use crate::core::scoring_config::NetworkConfig;
use crate::models::{ExternalProfile, RequesterContext};

/// True when the job title contains one of the configured seniority keywords
pub fn has_seniority_title(profile: &ExternalProfile, keywords: &[String]) -> bool {
    profile
        .current_title()
        .map(|title| keywords.iter().any(|k| title.contains(k.as_str())))
        .unwrap_or(false)
}

/// Additive quality of a candidate's external profile
pub fn quality(profile: &ExternalProfile, config: &NetworkConfig) -> f64 {
    let mut score = config.presence_score;

    if config.follower_cap > 0 {
        let capped = profile.follower_count.min(config.follower_cap) as f64;
        score += capped / config.follower_cap as f64 * config.follower_max_bonus;
    }

    if profile.summary.is_some() {
        score += config.summary_bonus;
    }
    if !profile.skills.is_empty() {
        score += config.skills_bonus;
    }
    if !profile.work_history.is_empty() {
        score += config.experience_bonus;
    }
    if has_seniority_title(profile, &config.seniority_keywords) {
        score += config.seniority_bonus;
    }

    unit(score)
}

/// Requesters without an external profile of their own give every candidate the base score
pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &NetworkConfig,
) -> Vec<f64> {
    if requester.profile.external.is_none() {
        return vec![base; candidates.len()];
    }

    candidates
        .iter()
        .map(|row| match &row.candidate.external {
            Some(profile) => quality(profile, config),
            None => base,
        })
        .collect()
}
