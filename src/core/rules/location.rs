use crate::core::features::FeatureRow;
use crate::core::scoring_config::LocationConfig;
use crate::models::{Location, RequesterContext};

/// How close two locations are, most specific tier first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocationTier {
    None,
    Region,
    Country,
    City,
}

pub fn tier(reference: &Location, other: &Location) -> LocationTier {
    fn same(a: &Option<String>, b: &Option<String>) -> bool {
        matches!((a, b), (Some(a), Some(b)) if a == b)
    }

    if same(&reference.city, &other.city) {
        LocationTier::City
    } else if same(&reference.country, &other.country) {
        LocationTier::Country
    } else if same(&reference.region, &other.region) {
        LocationTier::Region
    } else {
        LocationTier::None
    }
}

/// Best tier over every location signal the candidate carries
pub fn best_tier(reference: &Location, row: &FeatureRow) -> LocationTier {
    row.candidate
        .location_signals()
        .into_iter()
        .map(|signal| tier(reference, signal))
        .max()
        .unwrap_or(LocationTier::None)
}

pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &LocationConfig,
) -> Vec<f64> {
    let Some(reference) = requester.profile.location.as_ref().filter(|l| !l.is_empty()) else {
        return vec![base; candidates.len()];
    };

    candidates
        .iter()
        .map(|row| {
            let tier_score = match best_tier(reference, row) {
                LocationTier::City => config.city_score,
                LocationTier::Country => config.country_score,
                LocationTier::Region => config.region_score,
                LocationTier::None => base,
            };
            tier_score.max(base)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::*;
    use crate::models::{CandidateRecord, ExternalProfile, WorkExperience};

    fn loc(city: &str, country: &str, region: &str) -> Location {
        Location {
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            region: Some(region.to_string()),
        }
    }

    #[test]
    fn test_tiers() {
        let config = LocationConfig::default();
        let requester = RequesterContext {
            profile: CandidateRecord {
                location: Some(loc("berlin", "germany", "europe")),
                ..record("me")
            },
            ..Default::default()
        };

        let candidates = rows(
            &requester,
            vec![
                CandidateRecord {
                    location: Some(loc("berlin", "germany", "europe")),
                    ..record("a")
                },
                CandidateRecord {
                    location: Some(loc("munich", "germany", "europe")),
                    ..record("b")
                },
                CandidateRecord { location: Some(loc("paris", "france", "europe")), ..record("c") },
                CandidateRecord { location: Some(loc("tokyo", "japan", "asia")), ..record("d") },
                record("e"),
            ],
        );

        let scores = score(&candidates, &requester, config.base_score, &config);
        assert_eq!(scores, vec![1.0, 0.7, 0.5, 0.3, 0.3]);
    }

    #[test]
    fn test_work_history_location_counts() {
        let config = LocationConfig::default();
        let requester = RequesterContext {
            profile: CandidateRecord {
                location: Some(loc("berlin", "germany", "europe")),
                ..record("me")
            },
            ..Default::default()
        };

        let candidate = CandidateRecord {
            location: Some(loc("tokyo", "japan", "asia")),
            external: Some(ExternalProfile {
                work_history: vec![WorkExperience {
                    location: Some(loc("berlin", "germany", "europe")),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..record("a")
        };

        let candidates = rows(&requester, vec![candidate]);
        let scores = score(&candidates, &requester, config.base_score, &config);
        assert_eq!(scores, vec![1.0]);
    }
}
