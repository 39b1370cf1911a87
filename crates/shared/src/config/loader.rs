//! Configuration loader
//!
//! Loads configuration from an optional `.env` file followed by environment
//! variables, then validates the result.

use std::path::Path;

use super::dto::PlatformConfig;
use super::error::{ConfigError, Result};
use super::validator::validate_platform_config;

/// Configuration loader
///
/// Values from a `.env` file take precedence over the process environment,
/// which keeps local development overrides out of the system environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Optional path to .env file
    env_file_path: Option<std::path::PathBuf>,
}

impl ConfigLoader {
    /// Create a new ConfigLoader
    ///
    /// # Example
    ///
    /// ```
    /// use campus_shared::config::ConfigLoader;
    ///
    /// // Without .env file
    /// let loader = ConfigLoader::new(None);
    ///
    /// // With .env file
    /// let loader = ConfigLoader::new(Some(".env".into()));
    /// ```
    pub fn new(env_file_path: Option<std::path::PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load and validate the platform configuration
    ///
    /// Returns `Err(ConfigError)` if required configuration is missing or
    /// any value fails validation.
    pub fn load(&self) -> Result<PlatformConfig> {
        if let Some(path) = &self.env_file_path {
            self.load_env_file(path)?;
        }

        let config = PlatformConfig::from_env()?;
        validate_platform_config(&config)?;

        Ok(config)
    }

    fn load_env_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::EnvFileLoad {
                path: path.to_path_buf(),
                source: dotenvy::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file not found",
                )),
            });
        }

        dotenvy::from_path_override(path).map_err(|e| ConfigError::EnvFileLoad {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
