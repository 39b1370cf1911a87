//! Configuration validation

use super::dto::PlatformConfig;
use super::error::{ConfigError, Result};

/// Validate a loaded platform configuration
pub fn validate_platform_config(config: &PlatformConfig) -> Result<()> {
    validate_database_url(&config.database.url)?;

    if config.database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "CAMPUS_DB_MAX_CONNECTIONS must be greater than zero".to_string(),
        ));
    }

    if config.database.min_connections > config.database.max_connections {
        return Err(ConfigError::Validation(format!(
            "CAMPUS_DB_MIN_CONNECTIONS ({}) exceeds CAMPUS_DB_MAX_CONNECTIONS ({})",
            config.database.min_connections, config.database.max_connections
        )));
    }

    if config.rules.max_live_applications_per_institution == 0 {
        return Err(ConfigError::Validation(
            "CAMPUS_MAX_LIVE_APPLICATIONS must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_database_url(url: &str) -> Result<()> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidDatabaseUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::dto::{AdmissionRulesConfig, DatabaseConfig, LoggingConfig};

    fn valid_config() -> PlatformConfig {
        PlatformConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/campus".to_string(),
                max_connections: 20,
                min_connections: 2,
                acquire_timeout_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            rules: AdmissionRulesConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_platform_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let mut config = valid_config();
        config.database.url = "mysql://localhost/campus".to_string();
        assert!(matches!(
            validate_platform_config(&config),
            Err(ConfigError::InvalidDatabaseUrl(_))
        ));
    }

    #[test]
    fn test_rejects_zero_max_connections() {
        let mut config = valid_config();
        config.database.max_connections = 0;
        assert!(validate_platform_config(&config).is_err());
    }

    #[test]
    fn test_rejects_min_above_max_connections() {
        let mut config = valid_config();
        config.database.min_connections = 50;
        assert!(validate_platform_config(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_application_cap() {
        let mut config = valid_config();
        config.rules.max_live_applications_per_institution = 0;
        assert!(validate_platform_config(&config).is_err());
    }
}
