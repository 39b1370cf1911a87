use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use campus_domain::applications::{
    Application, ApplicationDocument, ApplicationRepository, EligibilityChecker,
    EligibilityDecision,
};
use campus_domain::courses::CourseDirectory;
use campus_domain::events::DomainEvent;
use campus_domain::notifications::NotificationGateway;
use campus_domain::request_context::{Caller, RequestContext};
use campus_domain::shared_kernel::{CourseId, DomainError, InstitutionId, Result, StudentId};

/// Request to submit a new course application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub institution_id: InstitutionId,
    pub personal_statement: String,
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub name: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationResponse {
    pub application_id: String,
    pub status: String,
    pub message: String,
}

/// Submits a course application after running the eligibility rules.
///
/// The eligibility check is advisory: the store's uniqueness guard is
/// the authoritative duplicate defence, so a race between two
/// concurrent submissions still resolves to a single stored row.
pub struct SubmitApplicationUseCase {
    applications: Arc<dyn ApplicationRepository>,
    eligibility: EligibilityChecker,
    notifications: Arc<dyn NotificationGateway>,
    max_live_applications_per_institution: u32,
}

impl SubmitApplicationUseCase {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        courses: Arc<dyn CourseDirectory>,
        notifications: Arc<dyn NotificationGateway>,
        max_live_applications_per_institution: u32,
    ) -> Self {
        let eligibility = EligibilityChecker::new(
            applications.clone(),
            courses,
            max_live_applications_per_institution,
        );
        Self {
            applications,
            eligibility,
            notifications,
            max_live_applications_per_institution,
        }
    }

    pub async fn execute(
        &self,
        request: SubmitApplicationRequest,
        context: &RequestContext,
    ) -> Result<SubmitApplicationResponse> {
        self.validate(&request)?;
        self.authorize(&request, context)?;

        info!(
            correlation_id = %context.correlation_id(),
            student_id = %request.student_id,
            course_id = %request.course_id,
            "Submitting course application"
        );

        let now = Utc::now();
        let decision = self
            .eligibility
            .check(
                &request.student_id,
                &request.course_id,
                &request.institution_id,
                now,
            )
            .await?;
        if let EligibilityDecision::Rejected(rejection) = decision {
            return Err(rejection.into_domain_error(
                request.student_id,
                request.course_id,
                request.institution_id,
                self.max_live_applications_per_institution,
            ));
        }

        let documents = request
            .documents
            .iter()
            .map(|d| ApplicationDocument {
                name: d.name.clone(),
                url: d.url.clone(),
                size_bytes: d.size_bytes,
                content_type: d.content_type.clone(),
                uploaded_at: now,
            })
            .collect();

        let application = Application::new(
            request.student_id,
            request.course_id,
            request.institution_id,
            request.personal_statement.trim().to_string(),
            documents,
        );

        // Authoritative uniqueness and cap race resolution happens here.
        self.applications.create(&application).await?;

        self.notify(DomainEvent::ApplicationSubmitted {
            application_id: application.id,
            student_id: application.student_id,
            course_id: application.course_id,
            institution_id: application.institution_id,
            occurred_at: now,
            correlation_id: context.correlation_id_owned(),
            actor: context.actor_owned(),
        })
        .await;

        info!(
            correlation_id = %context.correlation_id(),
            application_id = %application.id,
            "Course application submitted"
        );

        Ok(SubmitApplicationResponse {
            application_id: application.id.to_string(),
            status: application.status.to_string(),
            message: "Application submitted successfully".to_string(),
        })
    }

    fn validate(&self, request: &SubmitApplicationRequest) -> Result<()> {
        if request.personal_statement.trim().is_empty() {
            return Err(DomainError::InvalidField {
                field: "personal_statement".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        for document in &request.documents {
            if document.name.trim().is_empty() {
                return Err(DomainError::InvalidField {
                    field: "documents.name".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            if document.url.trim().is_empty() {
                return Err(DomainError::InvalidField {
                    field: "documents.url".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn authorize(&self, request: &SubmitApplicationRequest, context: &RequestContext) -> Result<()> {
        match context.caller() {
            Caller::Student(student_id) if *student_id == request.student_id => Ok(()),
            Caller::Admin(_) => Ok(()),
            _ => Err(DomainError::Unauthorized),
        }
    }

    async fn notify(&self, event: DomainEvent) {
        if let Err(e) = self.notifications.notify(&event).await {
            error!("Failed to dispatch notification: {}", e);
        }
    }
}
