use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use campus_domain::applications::{Application, ApplicationRepository};
use campus_domain::events::DomainEvent;
use campus_domain::notifications::NotificationGateway;
use campus_domain::request_context::{Caller, RequestContext};
use campus_domain::shared_kernel::{
    ApplicationId, ApplicationStatus, DomainError, Result,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionApplicationRequest {
    pub application_id: ApplicationId,
    pub target_status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionApplicationResponse {
    pub application_id: String,
    pub old_status: String,
    pub new_status: String,
}

/// Moves an admission application to a new status.
///
/// Authorization is ownership-based: students may only withdraw their own
/// application, institution reviewers may act only on applications addressed
/// to them, admins may do both. The write is a compare-and-swap on the status
/// read just before it; a lost race is re-read and retried exactly once, so
/// the legality check always runs against the freshest state.
pub struct TransitionApplicationUseCase {
    applications: Arc<dyn ApplicationRepository>,
    notifications: Arc<dyn NotificationGateway>,
}

impl TransitionApplicationUseCase {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            applications,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        request: TransitionApplicationRequest,
        context: &RequestContext,
    ) -> Result<TransitionApplicationResponse> {
        let mut retried = false;

        loop {
            let application = self
                .applications
                .find_by_id(&request.application_id)
                .await?
                .ok_or(DomainError::ApplicationNotFound {
                    application_id: request.application_id,
                })?;

            self.authorize(&application, request.target_status, context)?;

            let expected = application.status;
            let mut updated = application.clone();
            updated.transition_to(
                request.target_status,
                context.caller().reviewer_id(),
                request.notes.clone(),
                Utc::now(),
            )?;

            match self.applications.update_status(&expected, &updated).await {
                Ok(()) => {
                    info!(
                        correlation_id = %context.correlation_id(),
                        application_id = %updated.id,
                        from = %expected,
                        to = %updated.status,
                        "Application status changed"
                    );

                    self.notify(DomainEvent::ApplicationStatusChanged {
                        application_id: updated.id,
                        student_id: updated.student_id,
                        old_status: expected,
                        new_status: updated.status,
                        occurred_at: updated.updated_at,
                        correlation_id: context.correlation_id_owned(),
                        actor: context.actor_owned(),
                    })
                    .await;

                    return Ok(TransitionApplicationResponse {
                        application_id: updated.id.to_string(),
                        old_status: expected.to_string(),
                        new_status: updated.status.to_string(),
                    });
                }
                Err(DomainError::Conflict) if !retried => {
                    warn!(
                        correlation_id = %context.correlation_id(),
                        application_id = %request.application_id,
                        "Concurrent status change detected, retrying once"
                    );
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn authorize(
        &self,
        application: &Application,
        target: ApplicationStatus,
        context: &RequestContext,
    ) -> Result<()> {
        match context.caller() {
            Caller::Student(student_id) => {
                if *student_id == application.student_id
                    && target == ApplicationStatus::Withdrawn
                {
                    Ok(())
                } else {
                    Err(DomainError::Unauthorized)
                }
            }
            Caller::Institution { institution_id, .. } => {
                if *institution_id == application.institution_id {
                    Ok(())
                } else {
                    Err(DomainError::Unauthorized)
                }
            }
            Caller::Admin(_) => Ok(()),
            Caller::Company { .. } => Err(DomainError::Unauthorized),
        }
    }

    async fn notify(&self, event: DomainEvent) {
        if let Err(e) = self.notifications.notify(&event).await {
            error!("Failed to dispatch notification: {}", e);
        }
    }
}
