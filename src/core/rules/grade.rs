use crate::core::features::FeatureRow;
use crate::core::scoring_config::GradeConfig;
use crate::models::RequesterContext;

/// Seniority compatibility from the requester's grade to the candidate's
pub fn score(
    candidates: &[FeatureRow],
    requester: &RequesterContext,
    base: f64,
    config: &GradeConfig,
) -> Vec<f64> {
    let Some(from) = requester.profile.grade else {
        return vec![base; candidates.len()];
    };

    candidates
        .iter()
        .map(|row| match row.candidate.grade {
            Some(to) => config.weight(from, to),
            None => base,
        })
        .collect()
}
