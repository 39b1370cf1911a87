// Campus Platform - Domain Layer
// Bounded contexts:
// - shared_kernel: base types, ids and shared errors
// - applications: Application / JobApplication aggregates, eligibility rules,
//   repository ports
// - courses: read-only course reference data
// - events / notifications: lifecycle events and the outbound gateway port
// - request_context: explicit caller identity threaded through every call

pub mod applications;
pub mod courses;
pub mod events;
pub mod notifications;
pub mod request_context;
pub mod shared_kernel;

#[cfg(test)]
mod tests;

pub use applications::*;
pub use courses::*;
pub use events::*;
pub use notifications::*;
pub use request_context::*;
pub use shared_kernel::*;
