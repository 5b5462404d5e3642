//! Session configuration (layered: code > env > config file > defaults).

use std::path::Path;
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;

use crate::error::{FlowError, Result};

/// Default deadline for the first fragment. Cold-starting reasoning models
/// can sit silent for minutes.
pub const DEFAULT_INITIAL_TIMEOUT: Duration = Duration::from_secs(300);
/// Default deadline between two consecutive fragments.
pub const DEFAULT_INTER_FRAGMENT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MODEL: &str = "unknown";

const ENV_INITIAL_TIMEOUT: &str = "REASONFLOW_INITIAL_TIMEOUT_SECS";
const ENV_GAP_TIMEOUT: &str = "REASONFLOW_GAP_TIMEOUT_SECS";
const ENV_REASONING: &str = "REASONFLOW_REASONING";
const ENV_MODEL: &str = "REASONFLOW_MODEL";

/// Per-session settings for [`reconcile`](crate::reconcile::reconcile).
///
/// ```
/// use std::time::Duration;
/// use reasonflow::config::ReconcileConfig;
///
/// let config = ReconcileConfig::builder()
///     .inter_fragment_timeout(Duration::from_secs(30))
///     .model("deepseek-r1")
///     .build();
/// assert!(config.reasoning_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct ReconcileConfig {
    /// Deadline for the first fragment.
    #[builder(default = DEFAULT_INITIAL_TIMEOUT)]
    pub initial_timeout: Duration,
    /// Deadline between fragments once the first one arrived.
    #[builder(default = DEFAULT_INTER_FRAGMENT_TIMEOUT)]
    pub inter_fragment_timeout: Duration,
    /// Emit reasoning deltas. When off, reasoning is still separated from
    /// the answer and kept in the thinking record.
    #[builder(default = true)]
    pub reasoning_enabled: bool,
    /// Model name stamped on every content delta.
    #[builder(default = DEFAULT_MODEL.to_string(), into)]
    pub model: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// On-disk shape of a config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    initial_timeout_secs: Option<f64>,
    inter_fragment_timeout_secs: Option<f64>,
    reasoning_enabled: Option<bool>,
    model: Option<String>,
}

impl ReconcileConfig {
    /// Defaults overlaid with environment variables (`.env` is honored).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Defaults < config file (if given) < environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let mut config = Self::default();
        if let Some(secs) = file.initial_timeout_secs {
            config.initial_timeout = secs_to_duration("initial_timeout_secs", secs)?;
        }
        if let Some(secs) = file.inter_fragment_timeout_secs {
            config.inter_fragment_timeout =
                secs_to_duration("inter_fragment_timeout_secs", secs)?;
        }
        if let Some(enabled) = file.reasoning_enabled {
            config.reasoning_enabled = enabled;
        }
        if let Some(model) = file.model {
            config.model = model;
        }
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_INITIAL_TIMEOUT) {
            self.initial_timeout = parse_secs(ENV_INITIAL_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_GAP_TIMEOUT) {
            self.inter_fragment_timeout = parse_secs(ENV_GAP_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REASONING) {
            self.reasoning_enabled = parse_bool(ENV_REASONING, &raw)?;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            if !model.trim().is_empty() {
                self.model = model.trim().to_string();
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_timeout.is_zero() {
            return Err(FlowError::Configuration(
                "initial timeout must be greater than zero".to_string(),
            ));
        }
        if self.inter_fragment_timeout.is_zero() {
            return Err(FlowError::Configuration(
                "inter-fragment timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn secs_to_duration(key: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| FlowError::Configuration(format!("{key}: invalid duration {secs}")))
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FlowError::Configuration(format!("{key}: expected seconds, got {raw:?}")))?;
    secs_to_duration(key, secs)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FlowError::Configuration(format!(
            "{key}: expected a boolean, got {raw:?}"
        ))),
    }
}
