//! Configuration DTOs
//!
//! Plain data holders built from environment variables. Validation lives in
//! the `validator` module, loading orchestration in `loader`.

use super::error::{ConfigError, Result};

/// Complete platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub rules: AdmissionRulesConfig,
}

impl PlatformConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            rules: AdmissionRulesConfig::from_env()?,
        })
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (CAMPUS_DATABASE_URL, required)
    pub url: String,
    /// Maximum pool size (CAMPUS_DB_MAX_CONNECTIONS, default 20)
    pub max_connections: u32,
    /// Minimum pool size (CAMPUS_DB_MIN_CONNECTIONS, default 2)
    pub min_connections: u32,
    /// Connection acquisition timeout in seconds (CAMPUS_DB_ACQUIRE_TIMEOUT_SECS, default 30)
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("CAMPUS_DATABASE_URL").map_err(|_| {
            ConfigError::MissingRequired {
                var: "CAMPUS_DATABASE_URL".to_string(),
            }
        })?;

        Ok(Self {
            url,
            max_connections: parse_var("CAMPUS_DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_var("CAMPUS_DB_MIN_CONNECTIONS", 2)?,
            acquire_timeout_secs: parse_var("CAMPUS_DB_ACQUIRE_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Logging settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// EnvFilter directive (CAMPUS_LOG_LEVEL, default "info")
    pub level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            level: std::env::var("CAMPUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Business rule knobs for the admission lifecycle
#[derive(Debug, Clone)]
pub struct AdmissionRulesConfig {
    /// Maximum live applications per student per institution
    /// (CAMPUS_MAX_LIVE_APPLICATIONS, default 2)
    pub max_live_applications_per_institution: u32,
}

impl AdmissionRulesConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            max_live_applications_per_institution: parse_var("CAMPUS_MAX_LIVE_APPLICATIONS", 2)?,
        })
    }
}

impl Default for AdmissionRulesConfig {
    fn default() -> Self {
        Self {
            max_live_applications_per_institution: 2,
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, default: T) -> Result<T> {
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
