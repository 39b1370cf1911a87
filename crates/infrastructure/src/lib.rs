//! Infrastructure adapters for the application lifecycle core
//!
//! Persistence (in-memory and PostgreSQL), the notification gateway,
//! retry/backoff for store failures, and logging initialization.

pub mod notifications;
pub mod observability;
pub mod persistence;
pub mod retry;

pub use notifications::TracingNotificationGateway;
pub use persistence::in_memory::{
    InMemoryApplicationRepository, InMemoryCourseDirectory, InMemoryJobApplicationRepository,
};
pub use persistence::postgres::{
    DatabasePool, PostgresApplicationRepository, PostgresJobApplicationRepository,
};
pub use persistence::retrying::{RetryingApplicationRepository, RetryingJobApplicationRepository};
pub use retry::{BackoffConfig, with_retries};
