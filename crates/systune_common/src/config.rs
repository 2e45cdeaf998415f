//! Configuration loading.
//!
//! Config file: ~/.config/systune/config.toml. The API key can also
//! come from SYSTUNE_API_KEY (or OPENAI_API_KEY as a fallback). Core
//! logic never reads the environment itself - the resolved config is
//! handed to the advisory client at construction.

use crate::advisory::AdvisoryConfig;
use crate::error::SystuneError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystuneConfig {
    /// Advisory backend settings.
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

impl SystuneConfig {
    /// Default user config path: ~/.config/systune/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("systune").join("config.toml"))
    }

    /// Load the config file, then apply environment overrides for the
    /// API key. A missing file yields defaults.
    pub fn load() -> Result<Self, SystuneError> {
        let mut config = match Self::user_config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                Self::from_toml(&contents)
                    .map_err(|e| SystuneError::Config(format!("{}: {}", path.display(), e)))?
            }
            _ => Self::default(),
        };

        let env_key = std::env::var("SYSTUNE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
        if !env_key.is_empty() {
            config.advisory.api_key = env_key;
        }

        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, SystuneError> {
        toml::from_str(contents).map_err(|e| SystuneError::Config(e.to_string()))
    }
}
