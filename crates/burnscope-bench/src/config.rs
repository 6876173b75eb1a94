use burnscope_core::config::EngineConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_DECKS: u32 = 8;
const DEFAULT_BURN_MIN: u32 = 3;
const DEFAULT_BURN_MAX: u32 = 7;
const DEFAULT_TELL_NOISE: f64 = 0.3;
const DEFAULT_MONTE_CARLO_TRIALS: u32 = 500;
const MAX_DECKS: u32 = 16;
const NAME_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root harness configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub simulation: SimulationConfig,
    pub engines: Vec<EngineVariant>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let mut cfg: BenchmarkConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
                source,
                path: PathBuf::from("<inline>"),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Ok(cfg)
    }

    /// Checks every block; no I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_name("run_id", &self.run_id)?;
        self.simulation.validate()?;
        self.outputs.validate(&self.run_id)?;
        validate_engines(&self.engines)?;
        self.metrics.validate(&self.engines)?;
        self.logging.normalize();
        Ok(())
    }

    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    /// Name of the variant the others are compared against; the first one unless set.
    pub fn baseline(&self) -> &str {
        self.metrics
            .baseline
            .as_deref()
            .or_else(|| self.engines.first().map(|e| e.name.as_str()))
            .unwrap_or_default()
    }
}

/// How simulated shoes are dealt.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    pub sessions: usize,
    #[serde(default = "default_decks")]
    pub decks: u32,
    #[serde(default = "default_burn_min")]
    pub burn_min: u32,
    #[serde(default = "default_burn_max")]
    pub burn_max: u32,
    /// Hands dealt after the burn and before the analysis.
    pub hands: usize,
    /// Chance that a simulated dealer tell points at the wrong rank.
    #[serde(default = "default_tell_noise")]
    pub tell_noise: f64,
    #[serde(default = "default_monte_carlo_trials")]
    pub monte_carlo_trials: u32,
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.sessions == 0 {
            return Err(invalid("simulation.sessions", "number of sessions must be greater than zero"));
        }
        if self.decks == 0 || self.decks > MAX_DECKS {
            return Err(invalid(
                "simulation.decks",
                format!("decks must be between 1 and {MAX_DECKS}"),
            ));
        }
        if self.burn_min == 0 || self.burn_min > self.burn_max {
            return Err(invalid(
                "simulation.burn_min",
                "burn range must satisfy 1 <= burn_min <= burn_max",
            ));
        }
        let consumed = self.burn_max as usize + self.hands * 6;
        if consumed >= self.decks as usize * 52 {
            return Err(invalid(
                "simulation.hands",
                "burns plus hands would exhaust the shoe",
            ));
        }
        if !(0.0..=1.0).contains(&self.tell_noise) {
            return Err(invalid("simulation.tell_noise", "tell noise must lie in [0, 1]"));
        }
        Ok(())
    }
}

fn default_decks() -> u32 {
    DEFAULT_DECKS
}

fn default_burn_min() -> u32 {
    DEFAULT_BURN_MIN
}

fn default_burn_max() -> u32 {
    DEFAULT_BURN_MAX
}

fn default_tell_noise() -> f64 {
    DEFAULT_TELL_NOISE
}

fn default_monte_carlo_trials() -> u32 {
    DEFAULT_MONTE_CARLO_TRIALS
}

/// One engine configuration under test.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineVariant {
    pub name: String,
    #[serde(default = "default_true")]
    pub ml_enabled: bool,
    #[serde(default)]
    pub monte_carlo: bool,
}

impl EngineVariant {
    pub fn engine_config(&self, simulation: &SimulationConfig) -> EngineConfig {
        EngineConfig {
            ml_enabled: self.ml_enabled,
            monte_carlo_trials: simulation.monte_carlo_trials,
            monte_carlo_time_cap_ms: 0,
            monte_carlo_seed: simulation.seed.unwrap_or(0),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [("outputs.jsonl", &self.jsonl), ("outputs.summary_md", &self.summary_md)] {
            if value.trim().is_empty() {
                return Err(invalid(label, "path must not be empty"));
            }
            if resolve_template(run_id, value).components().count() == 0 {
                return Err(invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
}

impl MetricsConfig {
    fn validate(&self, engines: &[EngineVariant]) -> Result<(), ValidationError> {
        if let Some(baseline) = self.baseline.as_ref() {
            if !engines.iter().any(|e| &e.name == baseline) {
                return Err(invalid(
                    "metrics.baseline",
                    format!("baseline engine '{baseline}' is not defined in engines list"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if !name.chars().all(|c| NAME_ALLOWED.contains(c)) {
        return Err(invalid(
            field,
            "may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }
    Ok(())
}

fn validate_engines(engines: &[EngineVariant]) -> Result<(), ValidationError> {
    if engines.is_empty() {
        return Err(invalid("engines", "at least one engine variant must be specified"));
    }
    let mut seen = HashSet::new();
    for engine in engines {
        validate_name("engines.name", &engine.name)?;
        if !seen.insert(engine.name.as_str()) {
            return Err(invalid(
                "engines",
                format!("engine name '{}' defined more than once", engine.name),
            ));
        }
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
