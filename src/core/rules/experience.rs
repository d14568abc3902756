use chrono::Datelike;

use super::unit;
use crate::core::features::FeatureRow;
use crate::core::scoring_config::ProjectConfig;
use crate::models::{RequesterContext, WorkExperience};

/// Requester keywords the candidate's work history is searched for
fn reference_keywords(requester: &RequesterContext) -> Vec<&str> {
    let profile = &requester.profile;
    let mut keywords: Vec<&str> = Vec::new();
    for value in profile.skills.iter().chain(profile.expertise_areas.iter()) {
        if !keywords.contains(&value.as_str()) {
            keywords.push(value.as_str());
        }
    }
    keywords
}

fn is_recent(entry: &WorkExperience, current_year: i32, window: i32) -> bool {
    entry.is_current || entry.end_year.is_some_and(|end| current_year - end <= window)
}

pub fn experience_score(
    history: &[WorkExperience],
    keywords: &[&str],
    base: f64,
    current_year: i32,
    config: &ProjectConfig,
) -> f64 {
    let projects = (history.len() as f64 * config.per_project_bonus).min(config.max_project_bonus);

    let text: Vec<String> = history
        .iter()
        .map(|w| {
            let mut t = w.title.clone().unwrap_or_default();
            if let Some(description) = &w.description {
                t.push(' ');
                t.push_str(&description.to_lowercase());
            }
            t
        })
        .collect();
    let hits = keywords
        .iter()
        .filter(|k| text.iter().any(|t| t.contains(*k)))
        .count();
    let keyword_bonus = (hits as f64 * config.per_keyword_bonus).min(config.max_keyword_bonus);

    let recency = if history.iter().any(|w| is_recent(w, current_year, config.recency_years)) {
        config.recency_bonus
    } else {
        0.0
    };

    unit(base + projects + keyword_bonus + recency)
}

pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &ProjectConfig,
) -> Vec<f64> {
    let keywords = reference_keywords(requester);
    if keywords.is_empty() {
        return vec![base; candidates.len()];
    }
    let current_year = chrono::Utc::now().year();

    candidates
        .iter()
        .map(|row| {
            let history = row
                .candidate
                .external
                .as_ref()
                .map(|e| e.work_history.as_slice())
                .unwrap_or_default();
            if history.is_empty() {
                base
            } else {
                experience_score(history, &keywords, base, current_year, config)
            }
        })
        .collect()
}
