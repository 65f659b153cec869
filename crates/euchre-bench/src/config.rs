use euchre_core::model::player::PlayerPosition;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_DETERMINIZATIONS: usize = 8;
const MAX_DETERMINIZATIONS: usize = 10_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root rollout configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub deals: DealConfig,
    #[serde(default)]
    pub rollouts: RolloutConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
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
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deals.validate()?;
        self.rollouts.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        self.logging.validate()?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Deal generation block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    pub seed: Option<u64>,
    pub hands: usize,
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.hands == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.hands".to_string(),
                message: "number of hands must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// How each decision point samples hidden hands.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RolloutConfig {
    #[serde(default = "default_determinizations")]
    pub determinizations_per_decision: usize,
    /// Seats whose decisions are sampled; the rest play straight from the
    /// true deal.
    #[serde(default = "default_observer_seats")]
    pub observer_seats: Vec<PlayerPosition>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            determinizations_per_decision: default_determinizations(),
            observer_seats: default_observer_seats(),
        }
    }
}

impl RolloutConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.determinizations_per_decision == 0 {
            return Err(ValidationError::InvalidField {
                field: "rollouts.determinizations_per_decision".to_string(),
                message: "at least one determinization is required".to_string(),
            });
        }
        if self.determinizations_per_decision > MAX_DETERMINIZATIONS {
            return Err(ValidationError::InvalidField {
                field: "rollouts.determinizations_per_decision".to_string(),
                message: format!("must not exceed {MAX_DETERMINIZATIONS}"),
            });
        }
        for (index, seat) in self.observer_seats.iter().enumerate() {
            if self.observer_seats[..index].contains(seat) {
                return Err(ValidationError::InvalidField {
                    field: "rollouts.observer_seats".to_string(),
                    message: format!("seat {seat} listed more than once"),
                });
            }
        }
        Ok(())
    }

    pub fn observes(&self, seat: PlayerPosition) -> bool {
        self.observer_seats.contains(&seat)
    }
}

fn default_determinizations() -> usize {
    DEFAULT_DETERMINIZATIONS
}

fn default_observer_seats() -> Vec<PlayerPosition> {
    PlayerPosition::LOOP.to_vec()
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
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

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Level for `euchre_core::determinize` events; falls back to `tracing_level`.
    #[serde(default)]
    pub determinizer_level: Option<String>,
    /// Emit one event per card played.
    #[serde(default)]
    pub log_plays: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            determinizer_level: None,
            log_plays: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self.determinizer_level.as_deref() {
            Some(level) if parse_level(level).is_none() => Err(ValidationError::InvalidField {
                field: "logging.determinizer_level".to_string(),
                message: format!("unknown level {level:?}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn level(&self) -> Option<Level> {
        parse_level(&self.tracing_level)
    }

    pub fn determinizer_level(&self) -> Option<Level> {
        match self.determinizer_level.as_deref() {
            Some(level) => parse_level(level),
            None => self.level(),
        }
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
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
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "stage0_smoke"
deals:
  seed: 123
  hands: 16
rollouts:
  determinizations_per_decision: 4
  observer_seats: ["North", "South"]
outputs:
  jsonl: "bench/out/{run_id}/hands.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.rollouts.determinizations_per_decision, 4);
        assert!(cfg.rollouts.observes(PlayerPosition::South));
        assert!(!cfg.rollouts.observes(PlayerPosition::East));
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/stage0_smoke/hands.jsonl")
        );
    }

    #[test]
    fn rollout_block_defaults_to_every_seat() {
        let yaml = BASIC_YAML.replace(
            "rollouts:\n  determinizations_per_decision: 4\n  observer_seats: [\"North\", \"South\"]\n",
            "",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(
            cfg.rollouts.determinizations_per_decision,
            DEFAULT_DETERMINIZATIONS
        );
        assert_eq!(cfg.rollouts.observer_seats, PlayerPosition::LOOP.to_vec());
    }

    #[test]
    fn rejects_zero_determinizations() {
        let yaml = BASIC_YAML.replace(
            "determinizations_per_decision: 4",
            "determinizations_per_decision: 0",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "rollouts.determinizations_per_decision"
        ));
    }

    #[test]
    fn rejects_duplicate_observers() {
        let yaml = BASIC_YAML.replace("[\"North\", \"South\"]", "[\"North\", \"North\"]");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate seats should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "rollouts.observer_seats"
        ));
    }

    #[test]
    fn rejects_zero_hands() {
        let yaml = BASIC_YAML.replace("hands: 16", "hands: 0");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("stage0_smoke", "stage 0 smoke");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn determinizer_level_falls_back_to_tracing_level() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.determinizer_level(), Some(Level::DEBUG));
        assert!(!cfg.logging.log_plays);

        let yaml = BASIC_YAML.replace(
            "tracing_level: \"debug\"",
            "tracing_level: \"debug\"\n  determinizer_level: \"trace\"",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.determinizer_level(), Some(Level::TRACE));
    }

    #[test]
    fn rejects_unknown_determinizer_level() {
        let yaml = BASIC_YAML.replace(
            "tracing_level: \"debug\"",
            "tracing_level: \"debug\"\n  determinizer_level: \"loud\"",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("bad level");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "logging.determinizer_level"
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = BenchmarkConfig::from_path("does/not/exist.yaml").expect_err("missing");
        assert_eq!(err.path(), Path::new("does/not/exist.yaml"));
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
