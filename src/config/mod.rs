//! Configuration management for Herma

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Euphrosyne API (auth + catalog) settings
    pub euphrosyne: HostConfig,

    /// Euphrosyne tools API (folder init + upload credentials) settings
    pub tools: HostConfig,

    /// Explicit path to the azcopy binary, if not on PATH
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_path: Option<PathBuf>,
}

/// Base URL for one remote host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Base URL, without a trailing slash
    pub url: String,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".herma").join("config.yaml"))
    }

    /// Load configuration from a specific path, or the default location
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let mut config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        // Environment takes precedence over the file for the primary host
        if let Ok(url) = std::env::var("EUPHROSYNE_URL") {
            config.euphrosyne.url = url;
        }

        config.normalize();
        Ok(config)
    }

    /// Save configuration to a specific path, or the default location
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        let path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(&path, contents)?;

        Ok(())
    }

    /// Resolve the path that `load_at`/`save_at` would use
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    fn normalize(&mut self) {
        trim_trailing_slash(&mut self.euphrosyne.url);
        trim_trailing_slash(&mut self.tools.url);
    }
}

fn trim_trailing_slash(url: &mut String) {
    while url.ends_with('/') {
        url.pop();
    }
}
