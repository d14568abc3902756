// Core engine exports
pub mod error;
pub mod features;
pub mod intents;
pub mod normalizer;
pub mod orchestrator;
pub mod postprocess;
pub mod predictor;
pub mod presets;
pub mod rules;
pub mod scoring_config;

pub use error::{DataAccessError, MatchingError, PersistenceError};
pub use features::{FeatureAssembler, FeatureRow};
pub use orchestrator::{
    CandidateScope, DataLoader, MatchingOrchestrator, MatchingState, OrchestratorConfig,
    ResultSink,
};
pub use postprocess::{
    DiversificationSpec, ExclusionSpec, FilterSpec, PostProcessSpec, PostProcessor, Scored,
};
pub use predictor::{
    GradientBoostedPredictor, HeuristicPredictor, Predictor, PredictorError, PredictorKind,
    RuleSpec,
};
pub use presets::{ModelResolver, Preset, PresetDefinition, PresetRegistry, RuleEntry};
pub use rules::{Rule, RuleError, RuleParams, RuleRegistry, RuleResult};
pub use scoring_config::ScoringConfig;
