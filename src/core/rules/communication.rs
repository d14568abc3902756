use super::unit;
use crate::core::features::FeatureRow;
use crate::core::normalizer;
use crate::core::scoring_config::CommunicationConfig;
use crate::models::RequesterContext;

fn requested_styles(requester: &RequesterContext) -> Vec<String> {
    let mut styles = requester.profile.communication_styles.clone();
    if let Some(value) = requester.content.get("communication_style") {
        for style in normalizer::to_sequence(value) {
            if !styles.contains(&style) {
                styles.push(style);
            }
        }
    }
    styles
}

/// Shared languages plus a bonus for a compatible communication style
pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &CommunicationConfig,
) -> Vec<f64> {
    let languages = &requester.profile.languages;
    let styles = requested_styles(requester);
    if languages.is_empty() && styles.is_empty() {
        return vec![base; candidates.len()];
    }

    candidates
        .iter()
        .map(|row| {
            let candidate = &row.candidate;
            if candidate.languages.is_empty() && candidate.communication_styles.is_empty() {
                return base;
            }

            let shared = languages
                .iter()
                .filter(|l| candidate.languages.contains(l))
                .count();
            let language_bonus =
                (shared as f64 * config.per_shared_language).min(config.max_language_bonus);
            let style_bonus = if styles.iter().any(|s| candidate.communication_styles.contains(s)) {
                config.style_match_bonus
            } else {
                0.0
            };

            unit(base + language_bonus + style_bonus)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::*;
    use crate::models::CandidateRecord;

    #[test]
    fn test_languages_and_style() {
        let config = CommunicationConfig::default();
        let requester = RequesterContext {
            profile: CandidateRecord {
                languages: strings(&["english", "german", "french"]),
                communication_styles: strings(&["async"]),
                ..record("me")
            },
            ..Default::default()
        };
        let candidates = rows(
            &requester,
            vec![
                CandidateRecord {
                    languages: strings(&["english", "german", "french"]),
                    communication_styles: strings(&["async"]),
                    ..record("a")
                },
                CandidateRecord { languages: strings(&["english"]), ..record("b") },
            ],
        );

        let scores = score(&candidates, &requester, 0.4, &config);
        // language bonus capped at 0.3
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert!((scores[1] - 0.55).abs() < 1e-9);
    }
}
