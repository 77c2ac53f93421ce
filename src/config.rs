//! Configuration loading and logging initialization.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

use crate::advisor::AdvisorRules;
use crate::engine::{AnalyticsThresholds, HealthThresholds};
use crate::error::{ConfigError, Result};
use crate::forecast::ForecastConfig;

/// Crate configuration, loadable from a TOML file.
///
/// Every field defaults, so an empty file (or no file at all, via
/// `Config::default()`) yields the stock thresholds.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Threshold knobs for every heuristic in the engine.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub health: HealthThresholds,
    pub analytics: AnalyticsThresholds,
    pub forecast: ForecastConfig,
    pub advisor: AdvisorRules,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let forecast = &self.engine.forecast;
        if forecast.high_confidence_probability > 100 {
            return Err(ConfigError::InvalidValue {
                field: "forecast.high_confidence_probability",
                reason: "must be at most 100".into(),
            }
            .into());
        }
        if forecast.medium_confidence_probability > forecast.high_confidence_probability {
            return Err(ConfigError::InvalidValue {
                field: "forecast.medium_confidence_probability",
                reason: "must not exceed the high-confidence threshold".into(),
            }
            .into());
        }
        if self.engine.advisor.low_proposal_probability > 100 {
            return Err(ConfigError::InvalidValue {
                field: "advisor.low_proposal_probability",
                reason: "must be at most 100".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// Intended for the embedding application's entrypoint; the library
    /// itself only emits events.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
