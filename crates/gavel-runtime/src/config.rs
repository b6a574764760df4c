//! Judge configuration and engine tunables.
//!
//! Judges are declared in YAML and validated at load; any problem here
//! is fatal at startup, so the engine never sees a half-built judge.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::{PromptTemplate, TemplateError};

/// Default path consulted when `JUDGES_CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "configs/judges.yaml";

/// Pre-check mean below which Stage-2 is skipped.
pub const DEFAULT_EARLY_EXIT_THRESHOLD: f64 = 0.2;

/// Errors detected while loading configuration. All are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no judges configured in evaluators list")]
    NoEvaluators,

    #[error("no enabled judges found in config")]
    NoEnabledJudges,

    #[error("judge at index {0} is missing a name")]
    MissingName(usize),

    #[error("duplicate judge name: {0}")]
    DuplicateName(String),

    #[error("judge {0} is missing a prompt")]
    MissingPrompt(String),

    #[error("judge {name} has an invalid prompt template: {source}")]
    InvalidTemplate {
        name: String,
        #[source]
        source: TemplateError,
    },

    #[error("judge {0} resolves to max_tokens 0; judges need at least one token")]
    InvalidMaxTokens(String),

    #[error("judge {name} has temperature {value} outside [0.0, 1.0]")]
    InvalidTemperature { name: String, value: f64 },
}

/// Resolved model parameters for one judge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f64,

    #[serde(default)]
    pub retry: bool,
}

/// Per-judge model override; unset fields inherit from the default model.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelOverride {
    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub retry: Option<bool>,
}

/// Declarative description of one judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub requires_context: bool,

    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub model: Option<ModelOverride>,
}

impl JudgeSpec {
    /// The default model with this judge's overrides applied.
    pub fn resolved_model(&self, default: &ModelConfig) -> ModelConfig {
        let over = self.model.unwrap_or_default();
        ModelConfig {
            max_tokens: over.max_tokens.unwrap_or(default.max_tokens),
            temperature: over.temperature.unwrap_or(default.temperature),
            retry: over.retry.unwrap_or(default.retry),
        }
    }
}

/// The `judges:` section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judges {
    #[serde(default)]
    pub default_model: ModelConfig,

    #[serde(default)]
    pub evaluators: Vec<JudgeSpec>,
}

/// Root configuration for the judge pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgesConfig {
    pub judges: Judges,
}

impl JudgesConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: JudgesConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load from `JUDGES_CONFIG_PATH`, falling back to
    /// [`DEFAULT_CONFIG_PATH`].
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            env::var("JUDGES_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_yaml_file(path)
    }

    /// The canonical judge set shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(include_str!("../../../configs/judges.yaml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.judges.evaluators.is_empty() {
            return Err(ConfigError::NoEvaluators);
        }

        let mut seen = HashSet::new();
        for (index, spec) in self.judges.evaluators.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(ConfigError::MissingName(index));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateName(spec.name.clone()));
            }
            if spec.prompt.is_empty() {
                return Err(ConfigError::MissingPrompt(spec.name.clone()));
            }

            PromptTemplate::parse(&spec.prompt).map_err(|source| ConfigError::InvalidTemplate {
                name: spec.name.clone(),
                source,
            })?;

            let model = spec.resolved_model(&self.judges.default_model);
            if model.max_tokens == 0 {
                return Err(ConfigError::InvalidMaxTokens(spec.name.clone()));
            }
            if !(0.0..=1.0).contains(&model.temperature) {
                return Err(ConfigError::InvalidTemperature {
                    name: spec.name.clone(),
                    value: model.temperature,
                });
            }
        }

        Ok(())
    }
}

/// Engine tunables sourced from the environment.
///
/// An unset or unparsable variable silently falls back to its default.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Model id handed to the LLM adapter.
    pub model_id: String,

    /// Weight of the pre-check mean in the final confidence.
    pub precheck_weight: f64,

    /// Weight of the judge mean in the final confidence.
    pub llm_judge_weight: f64,

    /// Pre-check mean below which Stage-2 is skipped entirely.
    pub early_exit_threshold: f64,

    /// Overlap ratio below which the overlap checker reports low overlap.
    pub min_overlap_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_id: String::new(),
            precheck_weight: 0.3,
            llm_judge_weight: 0.7,
            early_exit_threshold: DEFAULT_EARLY_EXIT_THRESHOLD,
            min_overlap_threshold: 0.1,
        }
    }
}

impl Settings {
    /// Read tunables from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_id: env::var("GAVEL_MODEL_ID").unwrap_or(defaults.model_id),
            precheck_weight: env_f64("PRECHECK_WEIGHT", defaults.precheck_weight),
            llm_judge_weight: env_f64("LLM_JUDGE_WEIGHT", defaults.llm_judge_weight),
            early_exit_threshold: env_f64("EARLY_EXIT_THRESHOLD", defaults.early_exit_threshold),
            min_overlap_threshold: env_f64("MIN_OVERLAP_THRESHOLD", defaults.min_overlap_threshold),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
