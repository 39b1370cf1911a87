//! Notification gateway adapters
//!
//! The production deployment plugs an email/push provider in behind
//! `NotificationGateway`; this crate ships a tracing-backed adapter that
//! records every delivery as a structured log line.

use async_trait::async_trait;
use tracing::info;

use campus_domain::events::DomainEvent;
use campus_domain::notifications::{NotificationError, NotificationGateway};

/// Gateway that emits notifications as structured log records
#[derive(Clone, Default)]
pub struct TracingNotificationGateway;

impl TracingNotificationGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for TracingNotificationGateway {
    async fn notify(&self, event: &DomainEvent) -> Result<(), NotificationError> {
        info!(
            event_type = event.event_type(),
            recipient = event.recipient().map(|r| r.to_string()),
            occurred_at = %event.occurred_at(),
            "Notification dispatched"
        );
        Ok(())
    }
}
