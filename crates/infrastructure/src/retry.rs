//! Exponential backoff for infrastructure retries
//!
//! Used at the collaborator boundary when the store is temporarily
//! unavailable. Business-rule failures are never retried.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use campus_domain::shared_kernel::{DomainError, Result};

const DEFAULT_BASE_DELAY_MS: u64 = 100;
const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
const DEFAULT_JITTER_FACTOR: f64 = 0.1;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Reusable exponential backoff configuration
///
/// Delay doubles per retry from `base_delay`, capped at `max_delay`, with
/// ±`jitter_factor` random jitter to avoid thundering herds.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_factor: f64,
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            jitter_factor: DEFAULT_JITTER_FACTOR,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl BackoffConfig {
    pub fn can_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }

    /// Delay before the given retry (0-based), jittered
    pub fn calculate_delay(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.min(16);
        let raw_ms = self
            .base_delay
            .as_millis()
            .saturating_mul(1u128 << exponent)
            .min(self.max_delay.as_millis()) as u64;

        let jitter_range = (raw_ms as f64 * self.jitter_factor) as i64;
        if jitter_range == 0 {
            return Duration::from_millis(raw_ms);
        }
        let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
        Duration::from_millis(raw_ms.saturating_add_signed(jitter))
    }
}

/// Runs `operation` and retries it on `InfrastructureError` according to
/// `config`. Any other error is surfaced immediately.
pub async fn with_retries<T, F, Fut>(config: &BackoffConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retry_count = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(DomainError::InfrastructureError { message }) if config.can_retry(retry_count) => {
                let delay = config.calculate_delay(retry_count);
                tracing::warn!(
                    retry = retry_count + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "Store operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retry_count += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_doubles_per_retry() {
        let config = BackoffConfig {
            jitter_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = BackoffConfig {
            jitter_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(10), Duration::from_millis(5_000));
    }

    #[test]
    fn test_can_retry_respects_limit() {
        let config = BackoffConfig::default();
        assert!(config.can_retry(0));
        assert!(config.can_retry(2));
        assert!(!config.can_retry(3));
    }

    #[tokio::test]
    async fn test_with_retries_recovers_from_transient_failure() {
        let config = BackoffConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter_factor: 0.0,
            max_retries: 3,
        };
        let attempts = Arc::new(AtomicU32::new(0));

        let attempts_clone = attempts.clone();
        let result = with_retries(&config, move || {
            let attempts = attempts_clone.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(DomainError::InfrastructureError {
                        message: "store unavailable".to_string(),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retries_never_retries_business_rules() {
        let config = BackoffConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));

        let attempts_clone = attempts.clone();
        let result: Result<()> = with_retries(&config, move || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::Conflict)
            }
        })
        .await;

        assert!(matches!(result, Err(DomainError::Conflict)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
