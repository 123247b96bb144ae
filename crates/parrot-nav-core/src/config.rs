use std::path::Path;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NavConfig {
    pub router: RouterConfig,
    pub intents: IntentConfig,
    pub driver: DriverConfig,
    pub log: LogConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            intents: IntentConfig::default(),
            driver: DriverConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Emit `company=` next to `space=` for consumers still reading it.
    pub legacy_company_param: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IntentConfig {
    pub max_pending: usize,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self { max_pending: 8 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DriverConfig {
    pub max_echo_rounds: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { max_echo_rounds: 4 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub buffer_capacity: usize,
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 500,
            default_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl NavConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intents.max_pending == 0 {
            return Err(ConfigError::Invalid(
                "intents.max_pending must be at least 1".to_string(),
            ));
        }
        if self.driver.max_echo_rounds == 0 {
            return Err(ConfigError::Invalid(
                "driver.max_echo_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
