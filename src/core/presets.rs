//! Named settings presets.
//!
//! A preset fixes the predictor, the ordered base-rule list and the
//! post-processing steps of a request. Presets are plain data: built-in
//! definitions are merged with the ones found in configuration, resolved
//! once at startup and then shared read-only.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::MatchingError;
use crate::core::postprocess::{DiversificationSpec, ExclusionSpec, FilterSpec, PostProcessSpec};
use crate::core::predictor::{
    GradientBoostedPredictor, HeuristicPredictor, Predictor, PredictorKind, RuleSpec,
};
use crate::core::rules::{RuleParams, RuleRegistry};
use crate::core::scoring_config::ScoringConfig;

pub const DEFAULT_PRESET: &str = "default";

/// Turns an opaque model reference into a local artifact path
pub trait ModelResolver {
    fn resolve(&self, model_ref: &str) -> Result<PathBuf, String>;
}

/// One base-rule entry as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub rule: String,
    pub weight: f64,
    #[serde(default)]
    pub params: RuleParams,
}

impl RuleEntry {
    fn new(rule: &str, weight: f64) -> Self {
        Self {
            rule: rule.to_string(),
            weight,
            params: RuleParams::default(),
        }
    }
}

/// Unresolved preset, as found in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetDefinition {
    pub predictor: PredictorKind,
    pub rules: Vec<RuleEntry>,
    pub filters: Vec<FilterSpec>,
    pub diversification: Option<DiversificationSpec>,
    pub exclusion: ExclusionSpec,
}

/// Full base-rule list shared by the heuristic built-ins
pub fn default_rules() -> Vec<RuleEntry> {
    vec![
        RuleEntry::new("expertise", 0.3),
        RuleEntry::new("skill", 0.25),
        RuleEntry::new("grade", 0.2),
        RuleEntry::new("location", 0.15),
        RuleEntry::new("language", 0.1),
        RuleEntry::new("network_quality", 0.15),
        RuleEntry::new("project_experience", 0.1),
        RuleEntry::new("education", 0.05),
        RuleEntry::new("availability", 0.1),
        RuleEntry::new("communication_style", 0.1),
    ]
}

/// Built-in definitions; `boosted` only exists when a model is configured
pub fn builtin_definitions(model_ref: Option<&str>) -> HashMap<String, PresetDefinition> {
    let mut definitions = HashMap::new();

    definitions.insert(
        DEFAULT_PRESET.to_string(),
        PresetDefinition {
            rules: default_rules(),
            ..Default::default()
        },
    );
    definitions.insert(
        "diverse".to_string(),
        PresetDefinition {
            rules: default_rules(),
            diversification: Some(DiversificationSpec::ScoreBased {
                column: "city".to_string(),
                spacing: 3,
            }),
            ..Default::default()
        },
    );
    definitions.insert(
        "strict_expertise".to_string(),
        PresetDefinition {
            rules: default_rules(),
            filters: vec![FilterSpec::strict_from_requester("expertise")],
            ..Default::default()
        },
    );
    if let Some(model_ref) = model_ref {
        definitions.insert(
            "boosted".to_string(),
            PresetDefinition {
                predictor: PredictorKind::GradientBoosted {
                    model_ref: model_ref.to_string(),
                },
                ..Default::default()
            },
        );
    }

    definitions
}

/// A resolved preset, ready to serve requests
#[derive(Debug)]
pub struct Preset {
    pub name: String,
    pub predictor: Arc<dyn Predictor>,
    pub postprocess: PostProcessSpec,
}

impl Preset {
    pub fn new(name: &str, predictor: Arc<dyn Predictor>, postprocess: PostProcessSpec) -> Self {
        Self {
            name: name.to_string(),
            predictor,
            postprocess,
        }
    }
}

#[derive(Debug, Default)]
pub struct PresetRegistry {
    presets: HashMap<String, Arc<Preset>>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every definition; any invalid one fails the whole registry
    pub fn build(
        definitions: &HashMap<String, PresetDefinition>,
        scoring: Arc<ScoringConfig>,
        resolver: &dyn ModelResolver,
    ) -> Result<Self, MatchingError> {
        let rules = RuleRegistry::new();
        let mut models: HashMap<String, Arc<dyn Predictor>> = HashMap::new();
        let mut registry = Self::new();

        let mut names: Vec<&String> = definitions.keys().collect();
        names.sort();

        for name in names {
            let definition = &definitions[name];
            let invalid = |reason: String| {
                MatchingError::Configuration(format!("preset '{}': {}", name, reason))
            };

            let postprocess = PostProcessSpec {
                filters: definition.filters.clone(),
                diversification: definition.diversification.clone(),
                exclusion: definition.exclusion.clone(),
            };
            postprocess.validate().map_err(invalid)?;

            let predictor: Arc<dyn Predictor> = match &definition.predictor {
                PredictorKind::Heuristic => {
                    let specs = resolve_rules(&definition.rules, &rules).map_err(invalid)?;
                    Arc::new(HeuristicPredictor::new(Arc::clone(&scoring), specs))
                }
                PredictorKind::GradientBoosted { model_ref } => match models.get(model_ref) {
                    Some(model) => Arc::clone(model),
                    None => {
                        let model = load_model(model_ref, resolver).map_err(invalid)?;
                        models.insert(model_ref.clone(), Arc::clone(&model));
                        model
                    }
                },
            };

            tracing::info!(
                preset = %name,
                predictor = predictor.name(),
                filters = postprocess.filters.len(),
                diversified = postprocess.diversification.is_some(),
                "Registered settings preset"
            );
            registry.insert(Preset::new(name, predictor, postprocess));
        }

        Ok(registry)
    }

    /// Add or replace a preset, e.g. one carrying a custom filter predicate
    pub fn insert(&mut self, preset: Preset) {
        self.presets.insert(preset.name.clone(), Arc::new(preset));
    }

    pub fn get(&self, name: &str) -> Result<Arc<Preset>, MatchingError> {
        self.presets
            .get(name)
            .cloned()
            .ok_or_else(|| {
                MatchingError::Configuration(format!("unknown settings preset '{}'", name))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn resolve_rules(entries: &[RuleEntry], registry: &RuleRegistry) -> Result<Vec<RuleSpec>, String> {
    entries
        .iter()
        .map(|entry| {
            let rule = registry
                .get(&entry.rule)
                .ok_or_else(|| format!("unknown rule '{}'", entry.rule))?;
            if !(0.0..=1.0).contains(&entry.weight) {
                return Err(format!(
                    "weight {} of rule '{}' is outside [0, 1]",
                    entry.weight, entry.rule
                ));
            }
            Ok(RuleSpec {
                rule,
                weight: entry.weight,
                params: entry.params,
            })
        })
        .collect()
}

fn load_model(model_ref: &str, resolver: &dyn ModelResolver) -> Result<Arc<dyn Predictor>, String> {
    let path = resolver.resolve(model_ref)?;
    let mut predictor = GradientBoostedPredictor::new();
    predictor.load(&path).map_err(|e| e.to_string())?;
    Ok(Arc::new(predictor))
}
