pub use campus_shared::*;

/// Domain errors
///
/// Business-rule variants are expected outcomes surfaced to callers; they are
/// never logged as system errors. `InfrastructureError` wraps store and
/// network failures after retries are exhausted.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("Application not found: {application_id}")]
    ApplicationNotFound { application_id: ApplicationId },

    #[error("Job application not found: {job_application_id}")]
    JobApplicationNotFound {
        job_application_id: JobApplicationId,
    },

    #[error("Course not found: {course_id}")]
    CourseNotFound { course_id: CourseId },

    #[error(
        "Student {student_id} already has {limit} live applications at institution {institution_id}"
    )]
    ApplicationLimitExceeded {
        student_id: StudentId,
        institution_id: InstitutionId,
        limit: u32,
    },

    #[error("Student {student_id} already applied to course {course_id}")]
    DuplicateApplication {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("Student {student_id} already applied to job posting {posting_id}")]
    DuplicateJobApplication {
        student_id: StudentId,
        posting_id: JobPostingId,
    },

    #[error("Course {course_id} is not accepting applications")]
    CourseNotActive { course_id: CourseId },

    #[error("Application deadline for course {course_id} has passed")]
    DeadlinePassed { course_id: CourseId },

    #[error("Invalid application status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Invalid job application status transition from {from} to {to}")]
    InvalidJobStatusTransition {
        from: JobApplicationStatus,
        to: JobApplicationStatus,
    },

    /// Deliberately carries no record detail so an unauthorized caller
    /// cannot probe which records exist.
    #[error("Caller is not authorized to perform this operation")]
    Unauthorized,

    #[error("Concurrent update detected, operation not applied")]
    Conflict,

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Infrastructure error: {message}")]
    InfrastructureError { message: String },
}

impl DomainError {
    /// True for expected, user-facing rule violations
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            DomainError::ApplicationLimitExceeded { .. }
                | DomainError::DuplicateApplication { .. }
                | DomainError::DuplicateJobApplication { .. }
                | DomainError::CourseNotActive { .. }
                | DomainError::DeadlinePassed { .. }
                | DomainError::InvalidStatusTransition { .. }
                | DomainError::InvalidJobStatusTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Trait for aggregate roots
pub trait Aggregate {
    type Id;
    fn aggregate_id(&self) -> &Self::Id;
}
