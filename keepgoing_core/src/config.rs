//! Configuration file support for KeepGoing.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/keepgoing/config.toml`.

use crate::progression::{ProgressionPolicy, DEFAULT_MILESTONE_INTERVAL, DEFAULT_TARGET_INCREMENT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Progression prompt configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "default_milestone_interval")]
    pub milestone_interval: u32,

    #[serde(default = "default_target_increment")]
    pub target_increment: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            milestone_interval: default_milestone_interval(),
            target_increment: default_target_increment(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keepgoing")
}

fn default_milestone_interval() -> u32 {
    DEFAULT_MILESTONE_INTERVAL
}

fn default_target_increment() -> u32 {
    DEFAULT_TARGET_INCREMENT
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keepgoing")
            .join("config.toml")
    }

    /// Reject values the progression policy cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.progression.milestone_interval == 0 {
            return Err(Error::Config(
                "progression.milestone_interval must be at least 1".into(),
            ));
        }
        if self.progression.target_increment == 0 {
            return Err(Error::Config(
                "progression.target_increment must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn progression_policy(&self) -> ProgressionPolicy {
        ProgressionPolicy {
            milestone_interval: self.progression.milestone_interval,
            target_increment: self.progression.target_increment,
        }
    }
}
