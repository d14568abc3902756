//! Filtering, exclusion, diversification and top-N selection over scored candidates.

pub mod diversify;
pub mod exclusion;
pub mod filters;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{CandidateRecord, RequesterContext};

pub use diversify::DiversificationSpec;
pub use exclusion::ExclusionSpec;
pub use filters::{CandidatePredicate, FilterSpec};

/// A candidate paired with its predicted score
#[derive(Debug, Clone)]
pub struct Scored {
    pub candidate: CandidateRecord,
    pub score: f64,
}

impl Scored {
    pub fn new(candidate: CandidateRecord, score: f64) -> Self {
        Self { candidate, score }
    }
}

/// Post-processing steps of one settings preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessSpec {
    pub filters: Vec<FilterSpec>,
    pub diversification: Option<DiversificationSpec>,
    pub exclusion: ExclusionSpec,
}

impl PostProcessSpec {
    pub(crate) fn validate(&self) -> Result<(), String> {
        for filter in &self.filters {
            filter.validate()?;
        }
        if let Some(diversification) = &self.diversification {
            diversification.validate()?;
        }
        Ok(())
    }
}

/// Score descending, then id ascending so equal scores rank deterministically
fn by_score(a: &Scored, b: &Scored) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.candidate.user_id.cmp(&b.candidate.user_id))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostProcessor;

impl PostProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Filters, then exclusion, then diversification, then the top `top_n`
    pub fn run(
        &self,
        spec: &PostProcessSpec,
        requester: &RequesterContext,
        mut candidates: Vec<Scored>,
        top_n: usize,
    ) -> Vec<Scored> {
        let pool = candidates.len();

        for filter in &spec.filters {
            filter.apply(&mut candidates, requester);
        }
        spec.exclusion.apply(&mut candidates);

        candidates.sort_by(by_score);

        // Diversified order is final; it is not re-sorted by score
        let mut ranked = match &spec.diversification {
            Some(diversification) => diversification.apply(candidates, top_n),
            None => candidates,
        };
        ranked.truncate(top_n);

        tracing::debug!(
            requester_id = requester.user_id(),
            pool,
            returned = ranked.len(),
            "Post-processing finished"
        );

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::{record, strings};
    use crate::models::Location;

    fn ids(candidates: &[Scored]) -> Vec<&str> {
        candidates.iter().map(|c| c.candidate.user_id.as_str()).collect()
    }

    #[test]
    fn test_top_n_sorted_by_score() {
        let pool = vec![
            Scored::new(record("low"), 0.2),
            Scored::new(record("high"), 0.9),
            Scored::new(record("mid"), 0.5),
        ];
        let requester = RequesterContext::default();
        let out = PostProcessor::new().run(&PostProcessSpec::default(), &requester, pool, 2);
        assert_eq!(ids(&out), vec!["high", "mid"]);
    }

    #[test]
    fn test_equal_scores_break_ties_by_id() {
        let pool = vec![Scored::new(record("b"), 0.5), Scored::new(record("a"), 0.5)];
        let requester = RequesterContext::default();
        let out = PostProcessor::new().run(&PostProcessSpec::default(), &requester, pool, 5);
        assert_eq!(ids(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_full_pipeline() {
        let located = |id: &str, city: &str, expertise: &str, score: f64| {
            Scored::new(
                CandidateRecord {
                    location: Some(Location { city: Some(city.into()), ..Default::default() }),
                    expertise_areas: strings(&[expertise]),
                    ..record(id)
                },
                score,
            )
        };
        let pool = vec![
            located("a", "berlin", "development", 0.9),
            located("b", "berlin", "development", 0.8),
            located("c", "paris", "development", 0.7),
            located("d", "paris", "marketing", 0.95),
            located("e", "rome", "development", 0.6),
        ];
        let spec = PostProcessSpec {
            filters: vec![FilterSpec::strict("expertise", &["development"])],
            diversification: Some(DiversificationSpec::ScoreBased {
                column: "city".into(),
                spacing: 2,
            }),
            exclusion: ExclusionSpec { ids: vec!["e".into()], companies: vec![] },
        };

        let out = PostProcessor::new().run(&spec, &RequesterContext::default(), pool, 3);
        assert_eq!(ids(&out), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_spec_from_json() {
        let spec: PostProcessSpec = serde_json::from_str(
            r#"{
                "filters": [{"kind": "strict", "column": "expertise", "from_requester": true}],
                "diversification": {"kind": "score_based", "column": "city", "spacing": 3},
                "exclusion": {"companies": ["acme"]}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.filters.len(), 1);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.exclusion.companies, vec!["acme"]);
    }
}
