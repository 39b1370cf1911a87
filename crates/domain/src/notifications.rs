use async_trait::async_trait;
use thiserror::Error;

use crate::events::DomainEvent;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Failed to deliver notification: {0}")]
    DeliveryError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Outbound notification port
///
/// Invoked after a lifecycle operation commits. Callers treat delivery as
/// fire-and-forget: a failure is logged and never rolls back or fails the
/// operation that triggered it.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(&self, event: &DomainEvent) -> Result<(), NotificationError>;
}

impl From<NotificationError> for crate::shared_kernel::DomainError {
    fn from(err: NotificationError) -> Self {
        crate::shared_kernel::DomainError::InfrastructureError {
            message: err.to_string(),
        }
    }
}
