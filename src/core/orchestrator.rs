//! Sequencing of one matching request.
//!
//! `Loading → Scoring → Postprocessing → Persisting → Done`. The settings
//! preset and its predictor's readiness are checked before anything is
//! loaded; those rejections are not persisted. Any failure from
//! `Loading` onward is persisted as a failed [`MatchingResult`] and the
//! original error is returned to the caller; a failure of that error-path
//! write is logged and dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::core::error::{DataAccessError, MatchingError, PersistenceError};
use crate::core::features::FeatureAssembler;
use crate::core::postprocess::{PostProcessor, Scored};
use crate::core::predictor::PredictorError;
use crate::core::presets::{Preset, PresetRegistry};
use crate::models::{MatchingRequest, MatchingResult, RawExternalProfile, RawRequester, RawUser};

/// Which users are eligible to be ranked for a requester
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScope {
    pub requester_id: String,
    pub limit: usize,
}

/// Upstream data producer
pub trait DataLoader: Send + Sync {
    fn get_all_candidates(
        &self,
        scope: &CandidateScope,
    ) -> impl Future<Output = Result<Vec<RawUser>, DataAccessError>> + Send;

    fn get_requester(
        &self,
        requester_id: &str,
        intent_id: &str,
    ) -> impl Future<Output = Result<RawRequester, DataAccessError>> + Send;

    fn get_external_profiles(
        &self,
        user_ids: &[String],
    ) -> impl Future<Output = Result<HashMap<String, RawExternalProfile>, DataAccessError>> + Send;
}

/// Durable storage of one result per request
pub trait ResultSink: Send + Sync {
    fn save(
        &self,
        result: &MatchingResult,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingState {
    Loading,
    Scoring,
    Postprocessing,
    Persisting,
    Done,
}

impl MatchingState {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchingState::Loading => "loading",
            MatchingState::Scoring => "scoring",
            MatchingState::Postprocessing => "postprocessing",
            MatchingState::Persisting => "persisting",
            MatchingState::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound on the candidate pool loaded per request
    pub max_pool_size: usize,
    pub max_top_n: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 5000,
            max_top_n: 500,
        }
    }
}

pub struct MatchingOrchestrator<L, S> {
    loader: L,
    sink: S,
    presets: Arc<PresetRegistry>,
    assembler: FeatureAssembler,
    postprocessor: PostProcessor,
    config: OrchestratorConfig,
}

impl<L: DataLoader, S: ResultSink> MatchingOrchestrator<L, S> {
    pub fn new(
        loader: L,
        sink: S,
        presets: Arc<PresetRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            loader,
            sink,
            presets,
            assembler: FeatureAssembler::new(),
            postprocessor: PostProcessor::new(),
            config,
        }
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one request end to end and return the persisted result
    pub async fn run(&self, request: &MatchingRequest) -> Result<MatchingResult, MatchingError> {
        // Fail fast: nothing is loaded for an unknown preset
        let preset = self.presets.get(&request.settings_preset)?;
        if !preset.predictor.is_ready() {
            tracing::warn!(
                requester_id = %request.requester_id,
                preset = %preset.name,
                predictor = preset.predictor.name(),
                "Rejecting request, predictor has no model loaded"
            );
            return Err(PredictorError::NotLoaded(preset.predictor.name()).into());
        }

        tracing::info!(
            requester_id = %request.requester_id,
            intent_id = %request.intent_id,
            preset = %preset.name,
            top_n = request.top_n,
            "Matching request started"
        );

        match self.rank(request, &preset).await {
            Ok(candidate_ids) => {
                transition(request, MatchingState::Persisting);
                let result = MatchingResult::ranked(
                    &request.requester_id,
                    &request.intent_id,
                    &preset.name,
                    candidate_ids,
                );
                self.sink.save(&result).await?;
                transition(request, MatchingState::Done);

                tracing::info!(
                    requester_id = %request.requester_id,
                    intent_id = %request.intent_id,
                    result_id = %result.id,
                    ranked = result.ranked_ids().len(),
                    "Matching request finished"
                );
                Ok(result)
            }
            Err(e) => {
                transition(request, MatchingState::Persisting);
                let failed = MatchingResult::failed(
                    &request.requester_id,
                    &request.intent_id,
                    &preset.name,
                    e.code(),
                    e.to_string(),
                );
                if let Err(persist_error) = self.sink.save(&failed).await {
                    tracing::error!(
                        requester_id = %request.requester_id,
                        intent_id = %request.intent_id,
                        error = %persist_error,
                        "Failed to persist error result"
                    );
                }

                tracing::warn!(
                    requester_id = %request.requester_id,
                    intent_id = %request.intent_id,
                    code = e.code(),
                    error = %e,
                    "Matching request failed"
                );
                Err(e)
            }
        }
    }

    async fn rank(
        &self,
        request: &MatchingRequest,
        preset: &Preset,
    ) -> Result<Vec<String>, MatchingError> {
        transition(request, MatchingState::Loading);
        let requester_raw = self
            .loader
            .get_requester(&request.requester_id, &request.intent_id)
            .await?;
        let scope = CandidateScope {
            requester_id: request.requester_id.clone(),
            limit: self.config.max_pool_size,
        };
        let candidates_raw = self.loader.get_all_candidates(&scope).await?;

        let mut profile_ids: Vec<String> = candidates_raw.iter().map(|c| c.id.clone()).collect();
        profile_ids.push(requester_raw.user.id.clone());
        let profiles = self.loader.get_external_profiles(&profile_ids).await?;

        let requester = self
            .assembler
            .requester(&requester_raw, profiles.get(&requester_raw.user.id));
        let rows = self.assembler.assemble(requester, &candidates_raw, &profiles);

        transition(request, MatchingState::Scoring);
        let scores = preset.predictor.predict(&rows)?;
        if scores.len() != rows.len() {
            return Err(PredictorError::ShapeMismatch {
                predictor: preset.predictor.name(),
                expected: rows.len(),
                got: scores.len(),
            }
            .into());
        }

        transition(request, MatchingState::Postprocessing);
        let Some(main) = rows.first().map(|r| Arc::clone(&r.main)) else {
            return Ok(Vec::new());
        };
        let scored: Vec<Scored> = rows
            .into_iter()
            .zip(scores)
            .map(|(row, score)| Scored::new(row.candidate, score))
            .collect();

        let top_n = request.top_n.min(self.config.max_top_n);
        let ranked = self.postprocessor.run(&preset.postprocess, &main, scored, top_n);

        Ok(ranked.into_iter().map(|s| s.candidate.user_id).collect())
    }
}

fn transition(request: &MatchingRequest, state: MatchingState) {
    tracing::debug!(
        requester_id = %request.requester_id,
        intent_id = %request.intent_id,
        state = state.as_str(),
        "Matching state transition"
    );
}
