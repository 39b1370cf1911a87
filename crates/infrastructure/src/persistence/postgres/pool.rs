//! Centralized PostgreSQL connection pool management
//!
//! A single pool is created at startup and shared by every repository, so
//! connection settings stay consistent and independent pools cannot exhaust
//! the server. The initial connection is retried with backoff; once the pool
//! exists, sqlx reconnects lazily on its own.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use campus_domain::shared_kernel::DomainError;
use campus_shared::config::DatabaseConfig;

use crate::retry::{with_retries, BackoffConfig};

#[derive(Debug, Error)]
pub enum DatabasePoolError {
    #[error("Failed to connect to database: {0}")]
    Connection(String),
}

/// Shared database pool
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connect using the loaded platform configuration, retrying transient
    /// connection failures with exponential backoff
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabasePoolError> {
        let backoff = BackoffConfig::default();
        let pool = with_retries(&backoff, || async {
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
                .connect(&config.url)
                .await
                .map_err(|e| DomainError::InfrastructureError {
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| DatabasePoolError::Connection(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database pool initialized"
        );

        Ok(Self { pool })
    }

    /// Wrap an already-built pool (tests, embedded setups)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn inner(&self) -> &PgPool {
        &self.pool
    }
}
