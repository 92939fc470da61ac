//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::Path;
use streamstats_common::{Result as StatsResult, StatsError};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "STREAMSTATS_CONFIG";

/// Configuration files probed in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["streamstats.yaml", "streamstats.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for StatsError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        Self::config_with_source(message, err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        Self::load_config_with(path, |name| env::var(name).ok())
    }

    /// Load a YAML file, taking overrides from `lookup` instead of the process environment
    pub fn load_config_with<P, F>(path: P, lookup: F) -> Result<Config, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse_yaml(&content)?;

        Self::apply_overrides(&mut config, lookup)?;
        config.validate_all()?;

        debug!(path = %path.as_ref().display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse YAML text; an empty document yields the defaults
    pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the configuration: `STREAMSTATS_CONFIG`, then `streamstats.yaml`,
    /// then `streamstats.yml`, then built-in defaults
    pub fn load() -> StatsResult<Config> {
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            info!(path = %config_path, "Loading configuration from {}", CONFIG_PATH_VAR);
            return Ok(Self::load_config(&config_path)?);
        }

        if let Some(found) = DEFAULT_CONFIG_FILES
            .iter()
            .find(|candidate| Path::new(candidate).exists())
        {
            info!(path = %found, "Loading configuration");
            return Ok(Self::load_config(found)?);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::defaults_with(|name| env::var(name).ok())?)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StatsResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Defaults with overrides applied and validated
    pub fn defaults_with<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        Self::apply_overrides(&mut config, lookup)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Apply `STREAMSTATS_*` overrides to configuration
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("STREAMSTATS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(width) = lookup("STREAMSTATS_CHART_WIDTH") {
            config.chart.width = parse_var("STREAMSTATS_CHART_WIDTH", &width)?;
        }

        if let Some(height) = lookup("STREAMSTATS_CHART_HEIGHT") {
            config.chart.height = parse_var("STREAMSTATS_CHART_HEIGHT", &height)?;
        }

        if let Some(streamer) = lookup("STREAMSTATS_DEFAULT_STREAMER") {
            config.ingest.default_streamer = streamer;
        }

        if let Some(symbol) = lookup("STREAMSTATS_CURRENCY") {
            config.report.currency_symbol = symbol;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
