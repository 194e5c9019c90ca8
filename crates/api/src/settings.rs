//! Service Settings
//!
//! Layered configuration: an optional TOML file (path from `PLANT_CONFIG`,
//! default `config/plant.toml`) overridden by `PLANT_*` environment
//! variables, e.g. `PLANT_MODEL__ARTIFACT_PATH=/srv/models/bundle.json`.

use alerting::AlertConfig;
use anyhow::{bail, Context};
use data_validator::ValidationConfig;
use fallback::FallbackConfig;
use inference_engine::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};

use crate::rate_limit::RateLimitConfig;

/// Config file used when `PLANT_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/plant.toml";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Classifier bundle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Path to the model bundle manifest
    pub artifact_path: String,
    /// Decision threshold on the positive-class probability
    pub threshold: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            artifact_path: "models/failure_models.json".to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Input validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Reject out-of-range samples with 422
    pub enabled: bool,
    pub ranges: ValidationConfig,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ranges: ValidationConfig::default(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub validation: ValidationSettings,
    pub fallback: FallbackConfig,
    pub alerting: AlertConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load from `PLANT_CONFIG` (or the default path) and the environment
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("PLANT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&path)
    }

    /// Load from a specific file (optional) and the environment
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PLANT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read settings from {}", path))?
            .try_deserialize()
            .context("invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make diagnoses meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        let t = self.model.threshold;
        if !(0.0..=1.0).contains(&t) {
            bail!("model.threshold must be within [0, 1], got {}", t);
        }
        if self.alerting.watch_threshold > self.alerting.critical_threshold {
            bail!(
                "alerting.watch_threshold ({}) exceeds alerting.critical_threshold ({})",
                self.alerting.watch_threshold,
                self.alerting.critical_threshold
            );
        }
        Ok(())
    }
}
