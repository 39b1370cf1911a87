use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use campus_domain::applications::ApplicationRepository;
use campus_domain::courses::CourseDirectory;
use campus_domain::events::DomainEvent;
use campus_domain::notifications::NotificationGateway;
use campus_domain::request_context::{Caller, RequestContext};
use campus_domain::shared_kernel::{CourseId, DomainError, InstitutionId, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishAdmissionsRequest {
    pub institution_id: InstitutionId,
    pub course_id: CourseId,
}

/// Raised (not enforced) when the published cohort exceeds the course seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityWarning {
    pub seats: u32,
    pub published_total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishAdmissionsResponse {
    pub published_count: u32,
    pub capacity_warning: Option<CapacityWarning>,
}

/// Publishes the accepted cohort of one course in a single atomic batch.
///
/// Idempotent: already-published rows are skipped, so a retried call after a
/// partial failure report flips only the remainder. Seat capacity is reported
/// as a warning, never enforced.
pub struct PublishAdmissionsUseCase {
    applications: Arc<dyn ApplicationRepository>,
    courses: Arc<dyn CourseDirectory>,
    notifications: Arc<dyn NotificationGateway>,
}

impl PublishAdmissionsUseCase {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        courses: Arc<dyn CourseDirectory>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            applications,
            courses,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        request: PublishAdmissionsRequest,
        context: &RequestContext,
    ) -> Result<PublishAdmissionsResponse> {
        self.authorize(&request, context)?;

        let course = self
            .courses
            .find_by_id(&request.course_id)
            .await?
            .ok_or(DomainError::CourseNotFound {
                course_id: request.course_id,
            })?;
        if course.institution_id != request.institution_id {
            return Err(DomainError::Unauthorized);
        }

        let now = Utc::now();
        let published_count = self
            .applications
            .publish_cohort(&request.institution_id, &request.course_id, now)
            .await?;

        info!(
            correlation_id = %context.correlation_id(),
            course_id = %request.course_id,
            published_count,
            "Admissions cohort published"
        );

        let published_total = self
            .applications
            .count_published(&request.institution_id, &request.course_id)
            .await?;
        let capacity_warning = if published_total > course.seats {
            warn!(
                course_id = %request.course_id,
                seats = course.seats,
                published_total,
                "Published cohort exceeds course seats"
            );
            Some(CapacityWarning {
                seats: course.seats,
                published_total,
            })
        } else {
            None
        };

        if published_count > 0 {
            self.notify(DomainEvent::AdmissionsPublished {
                institution_id: request.institution_id,
                course_id: request.course_id,
                published_count,
                occurred_at: now,
                correlation_id: context.correlation_id_owned(),
                actor: context.actor_owned(),
            })
            .await;
        }

        Ok(PublishAdmissionsResponse {
            published_count,
            capacity_warning,
        })
    }

    fn authorize(&self, request: &PublishAdmissionsRequest, context: &RequestContext) -> Result<()> {
        match context.caller() {
            Caller::Institution { institution_id, .. }
                if *institution_id == request.institution_id =>
            {
                Ok(())
            }
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
