use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "applet-dialog.toml";
pub const DEFAULT_ALPHA: f64 = 0.85;
pub const DEFAULT_BETA: f64 = 0.25;
pub const DEFAULT_LABELS_DIR: &str = "data/label-maps";

pub const ENV_POLICY_ALPHA: &str = "APPLET_DIALOG_POLICY_ALPHA";
pub const ENV_POLICY_BETA: &str = "APPLET_DIALOG_POLICY_BETA";
pub const ENV_LABELS_DIR: &str = "APPLET_DIALOG_LABELS_DIR";
pub const ENV_LOGGING_LEVEL: &str = "APPLET_DIALOG_LOGGING_LEVEL";
pub const ENV_LOG_LEVEL: &str = "APPLET_DIALOG_LOG_LEVEL";
pub const ENV_LOGGING_FORMAT: &str = "APPLET_DIALOG_LOGGING_FORMAT";
pub const ENV_LOG_FORMAT: &str = "APPLET_DIALOG_LOG_FORMAT";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub policy: PolicyConfig,
    pub labels: LabelsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyConfig {
    pub alpha: f64,
    pub beta: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelsConfig {
    pub dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Confidence thresholds of the dialog policy. `alpha` is the bar for silent
/// acceptance and `beta` the bar below which a slot is asked for again.
///
/// Only constructible through [`Thresholds::new`], so a held value always
/// satisfies `0 <= beta <= alpha <= 1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    alpha: f64,
    beta: f64,
}

impl Thresholds {
    pub fn new(alpha: f64, beta: f64) -> Result<Self, ConfigError> {
        for (name, value) in [("policy.alpha", alpha), ("policy.beta", beta)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a number in range 0.0..=1.0, got {value}"
                )));
            }
        }
        if alpha < beta {
            return Err(ConfigError::Validation(format!(
                "policy.alpha ({alpha}) must not be lower than policy.beta ({beta})"
            )));
        }
        Ok(Self { alpha, beta })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { alpha: DEFAULT_ALPHA, beta: DEFAULT_BETA }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub labels_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig { alpha: DEFAULT_ALPHA, beta: DEFAULT_BETA },
            labels: LabelsConfig { dir: PathBuf::from(DEFAULT_LABELS_DIR) },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Validated thresholds for the dialog policy.
    pub fn thresholds(&self) -> Result<Thresholds, ConfigError> {
        Thresholds::new(self.policy.alpha, self.policy.beta)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(policy) = patch.policy {
            if let Some(alpha) = policy.alpha {
                self.policy.alpha = alpha;
            }
            if let Some(beta) = policy.beta {
                self.policy.beta = beta;
            }
        }

        if let Some(labels) = patch.labels {
            if let Some(dir) = labels.dir {
                self.labels.dir = dir;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env(ENV_POLICY_ALPHA) {
            self.policy.alpha = parse_f64(ENV_POLICY_ALPHA, &value)?;
        }
        if let Some(value) = read_env(ENV_POLICY_BETA) {
            self.policy.beta = parse_f64(ENV_POLICY_BETA, &value)?;
        }
        if let Some(value) = read_env(ENV_LABELS_DIR) {
            self.labels.dir = PathBuf::from(value);
        }

        let log_level = read_env(ENV_LOGGING_LEVEL).or_else(|| read_env(ENV_LOG_LEVEL));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env(ENV_LOGGING_FORMAT).or_else(|| read_env(ENV_LOG_FORMAT));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(alpha) = overrides.alpha {
            self.policy.alpha = alpha;
        }
        if let Some(beta) = overrides.beta {
            self.policy.beta = beta;
        }
        if let Some(labels_dir) = overrides.labels_dir {
            self.labels.dir = labels_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds()?;
        validate_labels(&self.labels)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `load` would read: `explicit_path` when it exists, else the
/// first default location that exists.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_labels(labels: &LabelsConfig) -> Result<(), ConfigError> {
    if labels.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("labels.dir must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    policy: Option<PolicyPatch>,
    labels: Option<LabelsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyPatch {
    alpha: Option<f64>,
    beta: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LabelsPatch {
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
