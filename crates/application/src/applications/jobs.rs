//! Job track use cases
//!
//! Structurally parallel to the course track but without eligibility rules
//! beyond the store's duplicate guard: a student may hold any number of live
//! job applications, just not two for the same posting.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use campus_domain::applications::{JobApplication, JobApplicationRepository};
use campus_domain::events::DomainEvent;
use campus_domain::notifications::NotificationGateway;
use campus_domain::request_context::{Caller, RequestContext};
use campus_domain::shared_kernel::{
    CompanyId, DomainError, JobApplicationId, JobApplicationStatus, JobPostingId, Result,
    StudentId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobApplicationRequest {
    pub student_id: StudentId,
    pub posting_id: JobPostingId,
    pub company_id: CompanyId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobApplicationResponse {
    pub job_application_id: String,
    pub status: String,
}

pub struct SubmitJobApplicationUseCase {
    job_applications: Arc<dyn JobApplicationRepository>,
    notifications: Arc<dyn NotificationGateway>,
}

impl SubmitJobApplicationUseCase {
    pub fn new(
        job_applications: Arc<dyn JobApplicationRepository>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            job_applications,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        request: SubmitJobApplicationRequest,
        context: &RequestContext,
    ) -> Result<SubmitJobApplicationResponse> {
        match context.caller() {
            Caller::Student(student_id) if *student_id == request.student_id => {}
            Caller::Admin(_) => {}
            _ => return Err(DomainError::Unauthorized),
        }

        let application =
            JobApplication::new(request.student_id, request.posting_id, request.company_id);

        self.job_applications.create(&application).await?;

        info!(
            correlation_id = %context.correlation_id(),
            job_application_id = %application.id,
            posting_id = %application.posting_id,
            "Job application submitted"
        );

        if let Err(e) = self
            .notifications
            .notify(&DomainEvent::JobApplicationSubmitted {
                job_application_id: application.id,
                student_id: application.student_id,
                posting_id: application.posting_id,
                company_id: application.company_id,
                occurred_at: application.applied_at,
                correlation_id: context.correlation_id_owned(),
                actor: context.actor_owned(),
            })
            .await
        {
            error!("Failed to dispatch notification: {}", e);
        }

        Ok(SubmitJobApplicationResponse {
            job_application_id: application.id.to_string(),
            status: application.status.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionJobApplicationRequest {
    pub job_application_id: JobApplicationId,
    pub target_status: JobApplicationStatus,
    #[serde(default)]
    pub offer_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionJobApplicationResponse {
    pub job_application_id: String,
    pub old_status: String,
    pub new_status: String,
}

pub struct TransitionJobApplicationUseCase {
    job_applications: Arc<dyn JobApplicationRepository>,
    notifications: Arc<dyn NotificationGateway>,
}

impl TransitionJobApplicationUseCase {
    pub fn new(
        job_applications: Arc<dyn JobApplicationRepository>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            job_applications,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        request: TransitionJobApplicationRequest,
        context: &RequestContext,
    ) -> Result<TransitionJobApplicationResponse> {
        let mut retried = false;

        loop {
            let application = self
                .job_applications
                .find_by_id(&request.job_application_id)
                .await?
                .ok_or(DomainError::JobApplicationNotFound {
                    job_application_id: request.job_application_id,
                })?;

            self.authorize(&application, request.target_status, context)?;

            let expected = application.status;
            let mut updated = application.clone();
            updated.transition_to(
                request.target_status,
                context.caller().reviewer_id(),
                request.offer_note.clone(),
                Utc::now(),
            )?;

            match self
                .job_applications
                .update_status(&expected, &updated)
                .await
            {
                Ok(()) => {
                    info!(
                        correlation_id = %context.correlation_id(),
                        job_application_id = %updated.id,
                        from = %expected,
                        to = %updated.status,
                        "Job application status changed"
                    );

                    if let Err(e) = self
                        .notifications
                        .notify(&DomainEvent::JobApplicationStatusChanged {
                            job_application_id: updated.id,
                            student_id: updated.student_id,
                            old_status: expected,
                            new_status: updated.status,
                            occurred_at: updated.updated_at,
                            correlation_id: context.correlation_id_owned(),
                            actor: context.actor_owned(),
                        })
                        .await
                    {
                        error!("Failed to dispatch notification: {}", e);
                    }

                    return Ok(TransitionJobApplicationResponse {
                        job_application_id: updated.id.to_string(),
                        old_status: expected.to_string(),
                        new_status: updated.status.to_string(),
                    });
                }
                Err(DomainError::Conflict) if !retried => {
                    warn!(
                        correlation_id = %context.correlation_id(),
                        job_application_id = %request.job_application_id,
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
        application: &JobApplication,
        target: JobApplicationStatus,
        context: &RequestContext,
    ) -> Result<()> {
        match context.caller() {
            Caller::Student(student_id) => {
                if *student_id == application.student_id
                    && target == JobApplicationStatus::Withdrawn
                {
                    Ok(())
                } else {
                    Err(DomainError::Unauthorized)
                }
            }
            Caller::Company { company_id, .. } => {
                if *company_id == application.company_id {
                    Ok(())
                } else {
                    Err(DomainError::Unauthorized)
                }
            }
            Caller::Admin(_) => Ok(()),
            Caller::Institution { .. } => Err(DomainError::Unauthorized),
        }
    }
}
