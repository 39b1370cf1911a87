//! Eligibility rules for new admission applications
//!
//! Read-only decision service: rules are evaluated in order and the first
//! failing rule wins. The decision is advisory under concurrency; the store
//! uniqueness guard in `ApplicationRepository::create` is the final backstop.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::applications::aggregate::ApplicationRepository;
use crate::courses::CourseDirectory;
use crate::shared_kernel::*;

/// Why an application may not be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityRejection {
    ApplicationLimitExceeded,
    DuplicateApplication,
    CourseNotActive,
    DeadlinePassed,
}

impl fmt::Display for EligibilityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityRejection::ApplicationLimitExceeded => {
                write!(f, "APPLICATION_LIMIT_EXCEEDED")
            }
            EligibilityRejection::DuplicateApplication => write!(f, "DUPLICATE_APPLICATION"),
            EligibilityRejection::CourseNotActive => write!(f, "COURSE_NOT_ACTIVE"),
            EligibilityRejection::DeadlinePassed => write!(f, "DEADLINE_PASSED"),
        }
    }
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityDecision {
    Eligible,
    Rejected(EligibilityRejection),
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityDecision::Eligible)
    }
}

/// Eligibility checker for the course track
///
/// Safe to call repeatedly; performs no writes.
pub struct EligibilityChecker {
    applications: Arc<dyn ApplicationRepository>,
    courses: Arc<dyn CourseDirectory>,
    max_live_per_institution: u32,
}

impl EligibilityChecker {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        courses: Arc<dyn CourseDirectory>,
        max_live_per_institution: u32,
    ) -> Self {
        Self {
            applications,
            courses,
            max_live_per_institution,
        }
    }

    /// Decides whether `student_id` may apply to `course_id` at
    /// `institution_id` as of `now` (caller-supplied clock).
    ///
    /// Rule order:
    /// 1. live applications at the institution >= cap → limit exceeded
    /// 2. a live application for the same course → duplicate
    /// 3. course not active → not accepting
    /// 4. deadline strictly before `now` → deadline passed
    pub async fn check(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
        institution_id: &InstitutionId,
        now: DateTime<Utc>,
    ) -> Result<EligibilityDecision> {
        let live_statuses = [
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
            ApplicationStatus::Waitlisted,
        ];
        let live_at_institution = self
            .applications
            .find_by_student(student_id, Some(&live_statuses))
            .await?
            .into_iter()
            .filter(|app| app.institution_id == *institution_id)
            .collect::<Vec<_>>();

        if live_at_institution.len() as u32 >= self.max_live_per_institution {
            return Ok(EligibilityDecision::Rejected(
                EligibilityRejection::ApplicationLimitExceeded,
            ));
        }

        if live_at_institution
            .iter()
            .any(|app| app.course_id == *course_id)
        {
            return Ok(EligibilityDecision::Rejected(
                EligibilityRejection::DuplicateApplication,
            ));
        }

        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(DomainError::CourseNotFound {
                course_id: *course_id,
            })?;

        // A mismatched institution would dodge the per-institution cap.
        if course.institution_id != *institution_id {
            return Err(DomainError::InvalidField {
                field: "institution_id".to_string(),
                reason: format!("course {} belongs to a different institution", course_id),
            });
        }

        if !course.status.accepts_applications() {
            return Ok(EligibilityDecision::Rejected(
                EligibilityRejection::CourseNotActive,
            ));
        }

        if course.application_deadline < now {
            return Ok(EligibilityDecision::Rejected(
                EligibilityRejection::DeadlinePassed,
            ));
        }

        Ok(EligibilityDecision::Eligible)
    }
}

impl EligibilityRejection {
    /// Maps the rejection to the matching domain error for a concrete
    /// submission attempt.
    pub fn into_domain_error(
        self,
        student_id: StudentId,
        course_id: CourseId,
        institution_id: InstitutionId,
        limit: u32,
    ) -> DomainError {
        match self {
            EligibilityRejection::ApplicationLimitExceeded => {
                DomainError::ApplicationLimitExceeded {
                    student_id,
                    institution_id,
                    limit,
                }
            }
            EligibilityRejection::DuplicateApplication => DomainError::DuplicateApplication {
                student_id,
                course_id,
            },
            EligibilityRejection::CourseNotActive => DomainError::CourseNotActive { course_id },
            EligibilityRejection::DeadlinePassed => DomainError::DeadlinePassed { course_id },
        }
    }
}
