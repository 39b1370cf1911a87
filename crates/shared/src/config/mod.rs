//! Platform configuration
//!
//! Loaded from an optional `.env` file plus environment variables, with the
//! `CAMPUS_` prefix. Split into DTOs, loader and validation.

pub mod dto;
pub mod error;
pub mod loader;
pub mod validator;

pub use dto::{AdmissionRulesConfig, DatabaseConfig, LoggingConfig, PlatformConfig};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use validator::validate_platform_config;
