//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scoring::ScoringRules;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub scoring: ScoringRules,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            scoring: ScoringRules::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pairing = &self.scoring.pairing;
        if pairing.min_pairs == 0 {
            return Err(ConfigError::ValidationError(
                "scoring.pairing.min_pairs must be greater than 0".to_string(),
            ));
        }

        if pairing.max_pairs < pairing.min_pairs {
            return Err(ConfigError::ValidationError(format!(
                "scoring.pairing.max_pairs ({}) must not be below min_pairs ({})",
                pairing.max_pairs, pairing.min_pairs
            )));
        }

        let points = &self.scoring.points;
        if points.league_win <= points.league_loss {
            return Err(ConfigError::ValidationError(
                "scoring.points.league_win must be greater than league_loss".to_string(),
            ));
        }

        if points.no_show > points.league_loss {
            return Err(ConfigError::ValidationError(
                "scoring.points.no_show must not exceed league_loss".to_string(),
            ));
        }

        Ok(())
    }
}
