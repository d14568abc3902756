use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::orchestrator::OrchestratorConfig;
use crate::core::presets::{builtin_definitions, PresetDefinition};
use crate::core::scoring_config::ScoringConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Extra or overriding settings presets, keyed by name
    #[serde(default)]
    pub presets: HashMap<String, PresetDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
    #[serde(default = "default_preset")]
    pub default_preset: String,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
            max_pool_size: default_max_pool_size(),
            default_preset: default_preset(),
        }
    }
}

fn default_top_n() -> usize { 20 }
fn default_max_top_n() -> usize { 500 }
fn default_max_pool_size() -> usize { 5000 }
fn default_preset() -> String { "default".to_string() }

impl MatchingSettings {
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_pool_size: self.max_pool_size,
            max_top_n: self.max_top_n,
        }
    }
}

/// Gradient boosted model artifact, enables the `boosted` preset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSettings {
    pub model_ref: Option<String>,
    pub artifact_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATCHING__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCHING__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Built-in presets overlaid with the configured ones
    pub fn preset_definitions(&self) -> HashMap<String, PresetDefinition> {
        let mut definitions = builtin_definitions(self.model.model_ref.as_deref());
        for (name, definition) in &self.presets {
            definitions.insert(name.clone(), definition.clone());
        }
        definitions
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MATCHING")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Let a plain DATABASE_URL win over the file value
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(database_url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", database_url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
