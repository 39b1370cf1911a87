//! PostgreSQL persistence
//!
//! Production implementations of the application store ports. The duplicate
//! guard is a partial unique index, CAS updates are conditional UPDATEs, and
//! cohort publishing runs in a single transaction.

pub mod application_repository;
pub mod job_application_repository;
pub mod pool;

pub use application_repository::PostgresApplicationRepository;
pub use job_application_repository::PostgresJobApplicationRepository;
pub use pool::{DatabasePool, DatabasePoolError};
