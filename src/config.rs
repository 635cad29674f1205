//! Configuration for the research log.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main configuration for the research log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path for storing state and transparency stats
    pub data_path: PathBuf,

    /// Directory receiving research log files
    pub log_dir: PathBuf,

    /// Default privacy decision when a caller does not make one
    pub include_private_data: bool,

    /// Mirror every written frame to the debug log
    pub echo_frames: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-research-log");

        Self {
            log_dir: data_dir.join("logs"),
            data_path: data_dir,
            include_private_data: false,
            echo_frames: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content).map_err(ConfigError::Parse)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-research-log")
            .join("config.json")
    }

    /// Whether to include private data, letting a per-run choice override the
    /// configured default in either direction.
    pub fn private_data_decision(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.include_private_data)
    }

    /// Path of the persisted transparency stats.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("transparency_stats.json")
    }

    /// A fresh, uniquely named research log file.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir
            .join(format!("research-{}.jsonl", uuid::Uuid::new_v4()))
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
}
