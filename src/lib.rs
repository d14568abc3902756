//! Intent Match - ranking engine for intent-aware professional matching
//!
//! This library ranks candidate users against a requester's meeting intent
//! (mentoring, referral, mock interview, project collaboration, networking).
//! It assembles normalized feature rows, scores them with a rule-based or
//! gradient boosted predictor and post-processes the ranking.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    DataLoader, MatchingError, MatchingOrchestrator, PresetRegistry, ResultSink, ScoringConfig,
};
pub use crate::models::{CandidateRecord, MatchingRequest, MatchingResult, RequesterContext};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = ScoringConfig::default();
        assert!(config.final_pass.min_score < config.final_pass.max_score);
    }
}
