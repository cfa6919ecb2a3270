use bayes_core::network::{BayesianNetwork, NetworkSpec};
use bayes_core::InferenceError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SAMPLES: usize = 10_000;
const DEFAULT_LOG_DIR: &str = "bench/out/{run_id}";
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root query configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QueryConfig {
    pub run_id: String,
    pub network: NetworkSpec,
    pub query: ProblemConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QueryConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: QueryConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    ///
    /// Builds the network once so that table and label errors surface here rather than at
    /// run time.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.sampling.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        let network = BayesianNetwork::from_spec(&self.network)?;
        self.query.validate(&network)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            log_dir: resolve_template(&self.run_id, &self.outputs.log_dir),
            summary_json: self
                .outputs
                .summary_json
                .as_deref()
                .map(|template| resolve_template(&self.run_id, template)),
        }
    }
}

/// Which events the query tests, keyed by event label with the queried choice label.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProblemConfig {
    pub outcome: BTreeMap<String, String>,
    #[serde(default)]
    pub evidence: BTreeMap<String, String>,
}

impl ProblemConfig {
    fn validate(&self, network: &BayesianNetwork) -> Result<(), ValidationError> {
        if self.outcome.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "query.outcome".to_string(),
                message: "at least one outcome event must be specified".to_string(),
            });
        }

        for (field, entries) in [
            ("query.outcome", &self.outcome),
            ("query.evidence", &self.evidence),
        ] {
            for (label, choice) in entries {
                let id = network
                    .require(label)
                    .map_err(|_| ValidationError::InvalidField {
                        field: field.to_string(),
                        message: format!("event '{label}' is not defined in the network"),
                    })?;
                if let Some(event) = network.event(id) {
                    event.choice_index(choice)?;
                }
            }
        }

        if let Some(label) = self
            .outcome
            .keys()
            .find(|label| self.evidence.contains_key(*label))
        {
            return Err(ValidationError::InvalidField {
                field: "query".to_string(),
                message: format!("event '{label}' is both outcome and evidence"),
            });
        }

        Ok(())
    }
}

/// Sampling configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SamplingConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            samples: DEFAULT_SAMPLES,
        }
    }
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.samples == 0 {
            return Err(ValidationError::InvalidField {
                field: "sampling.samples".to_string(),
                message: "number of samples must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    #[serde(default)]
    pub summary_json: Option<String>,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            summary_json: None,
            log_dir: default_log_dir(),
        }
    }
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        let summary = self.summary_json.as_ref();
        for (label, value) in [
            ("outputs.summary_json", summary),
            ("outputs.log_dir", Some(&self.log_dir)),
        ] {
            let Some(value) = value else {
                continue;
            };
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn default_log_dir() -> String {
    DEFAULT_LOG_DIR.to_string()
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Log every event state's diagnostic string after the query runs.
    #[serde(default)]
    pub state_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            state_details: false,
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

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub log_dir: PathBuf,
    pub summary_json: Option<PathBuf>,
}

/// Errors surfaced when loading configuration files.
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

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("network: {0}")]
    Network(#[from] InferenceError),
}
