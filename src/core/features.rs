use std::collections::HashMap;
use std::sync::Arc;

use crate::core::normalizer;
use crate::models::{
    CandidateRecord, ExternalProfile, IntentType, RawExternalProfile, RawRequester, RawUser,
    RequesterContext,
};

/// One scoring input: the candidate plus a shared read-only copy of the requester
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub candidate: CandidateRecord,
    pub main: Arc<RequesterContext>,
}

/// Builds normalized feature rows for one matching request
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Normalize the requester row and attach its external profile
    pub fn requester(
        &self,
        raw: &RawRequester,
        external: Option<&RawExternalProfile>,
    ) -> RequesterContext {
        let intent = normalizer::to_scalar(&raw.intent_type)
            .map(|label| IntentType::parse(&label))
            .unwrap_or_default();

        if intent == IntentType::Unknown {
            tracing::debug!(
                intent_id = %raw.intent_id,
                raw_intent = %raw.intent_type,
                "Requester intent not recognized, composite scoring will be skipped"
            );
        }

        RequesterContext {
            profile: self.candidate(&raw.user, external),
            intent_id: raw.intent_id.clone(),
            intent,
            content: raw.content.clone(),
        }
    }

    /// Normalize one user row
    pub fn candidate(
        &self,
        raw: &RawUser,
        external: Option<&RawExternalProfile>,
    ) -> CandidateRecord {
        CandidateRecord {
            user_id: raw.id.clone(),
            grade: normalizer::to_grade(&raw.grade),
            location: normalizer::to_location(&raw.location),
            company: normalizer::to_scalar(&raw.company),
            expertise_areas: normalizer::to_sequence(&raw.expertise_areas),
            skills: normalizer::to_sequence(&raw.skills),
            languages: normalizer::to_sequence(&raw.languages),
            industries: normalizer::to_sequence(&raw.industries),
            availability: normalizer::to_sequence(&raw.availability),
            meeting_formats: normalizer::to_sequence(&raw.meeting_formats),
            communication_styles: normalizer::to_sequence(&raw.communication_styles),
            external: external.map(|e| self.external_profile(e)),
        }
    }

    pub fn external_profile(&self, raw: &RawExternalProfile) -> ExternalProfile {
        ExternalProfile {
            follower_count: normalizer::to_count(&raw.follower_count),
            headline: normalizer::to_scalar(&raw.headline),
            summary: normalizer::to_text(&raw.summary),
            skills: normalizer::to_sequence(&raw.skills),
            location: normalizer::to_location(&raw.location),
            work_history: raw
                .work_history
                .iter()
                .filter_map(normalizer::to_work_experience)
                .collect(),
            education: raw.education.iter().filter_map(normalizer::to_education).collect(),
        }
    }

    /// Build one row per candidate, skipping the requester itself
    pub fn assemble(
        &self,
        requester: RequesterContext,
        candidates: &[RawUser],
        external_profiles: &HashMap<String, RawExternalProfile>,
    ) -> Vec<FeatureRow> {
        let main = Arc::new(requester);

        let rows: Vec<FeatureRow> = candidates
            .iter()
            .filter(|raw| raw.id != main.profile.user_id)
            .map(|raw| FeatureRow {
                candidate: self.candidate(raw, external_profiles.get(&raw.id)),
                main: Arc::clone(&main),
            })
            .collect();

        tracing::debug!(
            requester_id = %main.profile.user_id,
            candidates = candidates.len(),
            rows = rows.len(),
            "Assembled feature rows"
        );

        rows
    }
}
