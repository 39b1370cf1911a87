//! Lifecycle domain events
//!
//! Emitted after a lifecycle operation commits and consumed by the
//! notification gateway. Every event carries `occurred_at` plus optional
//! correlation id and actor label for audit trails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared_kernel::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A student submitted a new admission application
    ApplicationSubmitted {
        application_id: ApplicationId,
        student_id: StudentId,
        course_id: CourseId,
        institution_id: InstitutionId,
        occurred_at: DateTime<Utc>,
        correlation_id: Option<String>,
        actor: Option<String>,
    },
    /// An admission application changed status
    ApplicationStatusChanged {
        application_id: ApplicationId,
        student_id: StudentId,
        old_status: ApplicationStatus,
        new_status: ApplicationStatus,
        occurred_at: DateTime<Utc>,
        correlation_id: Option<String>,
        actor: Option<String>,
    },
    /// An institution published its accepted cohort for a course
    AdmissionsPublished {
        institution_id: InstitutionId,
        course_id: CourseId,
        published_count: u32,
        occurred_at: DateTime<Utc>,
        correlation_id: Option<String>,
        actor: Option<String>,
    },
    /// A student submitted a new job application
    JobApplicationSubmitted {
        job_application_id: JobApplicationId,
        student_id: StudentId,
        posting_id: JobPostingId,
        company_id: CompanyId,
        occurred_at: DateTime<Utc>,
        correlation_id: Option<String>,
        actor: Option<String>,
    },
    /// A job application changed status
    JobApplicationStatusChanged {
        job_application_id: JobApplicationId,
        student_id: StudentId,
        old_status: JobApplicationStatus,
        new_status: JobApplicationStatus,
        occurred_at: DateTime<Utc>,
        correlation_id: Option<String>,
        actor: Option<String>,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::ApplicationSubmitted { .. } => "application.submitted",
            DomainEvent::ApplicationStatusChanged { .. } => "application.status_changed",
            DomainEvent::AdmissionsPublished { .. } => "admissions.published",
            DomainEvent::JobApplicationSubmitted { .. } => "job_application.submitted",
            DomainEvent::JobApplicationStatusChanged { .. } => "job_application.status_changed",
        }
    }

    /// The student to notify, when the event targets a single student
    pub fn recipient(&self) -> Option<StudentId> {
        match self {
            DomainEvent::ApplicationSubmitted { student_id, .. }
            | DomainEvent::ApplicationStatusChanged { student_id, .. }
            | DomainEvent::JobApplicationSubmitted { student_id, .. }
            | DomainEvent::JobApplicationStatusChanged { student_id, .. } => Some(*student_id),
            DomainEvent::AdmissionsPublished { .. } => None,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::ApplicationSubmitted { occurred_at, .. }
            | DomainEvent::ApplicationStatusChanged { occurred_at, .. }
            | DomainEvent::AdmissionsPublished { occurred_at, .. }
            | DomainEvent::JobApplicationSubmitted { occurred_at, .. }
            | DomainEvent::JobApplicationStatusChanged { occurred_at, .. } => *occurred_at,
        }
    }
}
