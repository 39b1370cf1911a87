// Application lifecycle bounded context
//
// Aggregates for the two tracks (course admissions, job applications) plus
// the repository ports the lifecycle operates through.

use crate::shared_kernel::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document attached to an application (transcript, resume, ...)
///
/// Owned by the application, append-only from the student's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDocument {
    pub name: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Admission application aggregate (course track)
///
/// Never hard-deleted; withdrawal is a terminal status transition that frees
/// the (student, course) uniqueness slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub institution_id: InstitutionId,
    pub status: ApplicationStatus,
    pub personal_statement: String,
    pub documents: Vec<ApplicationDocument>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub admitted_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn new(
        student_id: StudentId,
        course_id: CourseId,
        institution_id: InstitutionId,
        personal_statement: String,
        documents: Vec<ApplicationDocument>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::new(),
            student_id,
            course_id,
            institution_id,
            status: ApplicationStatus::Pending,
            personal_statement,
            documents,
            applied_at: now,
            updated_at: now,
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
            admitted_at: None,
            published: false,
            withdrawn_at: None,
        }
    }

    /// Applies a status transition, enforcing the allowed-edge table.
    ///
    /// `reviewer` is the acting reviewer when the actor is not the owning
    /// student; it stamps `reviewed_by`/`reviewed_at`. `Accepted` stamps
    /// `admitted_at` (only once), `Withdrawn` stamps `withdrawn_at`.
    pub fn transition_to(
        &mut self,
        target: ApplicationStatus,
        reviewer: Option<UserId>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.status.can_transition_to(&target) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        self.updated_at = now;

        if let Some(reviewer_id) = reviewer {
            self.reviewed_by = Some(reviewer_id);
            self.reviewed_at = Some(now);
        }
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }

        match target {
            ApplicationStatus::Accepted if self.admitted_at.is_none() => {
                self.admitted_at = Some(now);
            }
            ApplicationStatus::Withdrawn => {
                self.withdrawn_at = Some(now);
            }
            _ => {}
        }

        Ok(())
    }

    /// True while the application counts toward the per-institution cap
    pub fn is_live(&self) -> bool {
        self.status.counts_toward_cap()
    }
}

impl Aggregate for Application {
    type Id = ApplicationId;

    fn aggregate_id(&self) -> &Self::Id {
        &self.id
    }
}

/// Job application aggregate, structurally parallel to `Application` but
/// with its own, smaller state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: JobApplicationId,
    pub student_id: StudentId,
    pub posting_id: JobPostingId,
    pub company_id: CompanyId,
    pub status: JobApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interview_at: Option<DateTime<Utc>>,
    pub offer_note: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl JobApplication {
    pub fn new(student_id: StudentId, posting_id: JobPostingId, company_id: CompanyId) -> Self {
        let now = Utc::now();
        Self {
            id: JobApplicationId::new(),
            student_id,
            posting_id,
            company_id,
            status: JobApplicationStatus::Pending,
            applied_at: now,
            updated_at: now,
            interview_at: None,
            offer_note: None,
            reviewed_by: None,
            reviewed_at: None,
            withdrawn_at: None,
        }
    }

    pub fn transition_to(
        &mut self,
        target: JobApplicationStatus,
        reviewer: Option<UserId>,
        offer_note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.status.can_transition_to(&target) {
            return Err(DomainError::InvalidJobStatusTransition {
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        self.updated_at = now;

        if let Some(reviewer_id) = reviewer {
            self.reviewed_by = Some(reviewer_id);
            self.reviewed_at = Some(now);
        }
        if let Some(note) = offer_note {
            self.offer_note = Some(note);
        }

        match target {
            JobApplicationStatus::Interview if self.interview_at.is_none() => {
                self.interview_at = Some(now);
            }
            JobApplicationStatus::Withdrawn => {
                self.withdrawn_at = Some(now);
            }
            _ => {}
        }

        Ok(())
    }
}

impl Aggregate for JobApplication {
    type Id = JobApplicationId;

    fn aggregate_id(&self) -> &Self::Id {
        &self.id
    }
}

/// Repository port for admission applications (the application store)
///
/// Concurrency contract:
/// - `create` is the authoritative uniqueness guard: it must fail with
///   `DuplicateApplication` when a non-withdrawn row exists for the same
///   (student, course), with at-most-one-winner semantics under concurrent
///   submissions.
/// - `update_status` is a compare-and-swap keyed on the status the caller
///   read immediately before the write; it fails with `Conflict` when the
///   stored status changed in between.
/// - `publish_cohort` flips `published` on every matching row in a single
///   all-or-nothing batch and stamps `admitted_at` only where unset.
#[async_trait::async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: &Application) -> Result<()>;

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>>;

    async fn update(&self, application: &Application) -> Result<()>;

    async fn update_status(
        &self,
        expected: &ApplicationStatus,
        application: &Application,
    ) -> Result<()>;

    async fn find_by_student(
        &self,
        student_id: &StudentId,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>>;

    async fn find_by_institution(
        &self,
        institution_id: &InstitutionId,
        course_id: Option<&CourseId>,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>>;

    /// Atomically publishes the accepted, unpublished cohort for one course.
    /// Returns the number of rows flipped; idempotent under retry.
    async fn publish_cohort(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
        now: DateTime<Utc>,
    ) -> Result<u32>;

    /// Total published rows for one course, for capacity reporting
    async fn count_published(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
    ) -> Result<u32>;
}

/// Repository port for job applications
#[async_trait::async_trait]
pub trait JobApplicationRepository: Send + Sync {
    /// Same uniqueness guard as the course track, keyed on (student, posting)
    async fn create(&self, application: &JobApplication) -> Result<()>;

    async fn find_by_id(&self, id: &JobApplicationId) -> Result<Option<JobApplication>>;

    async fn update_status(
        &self,
        expected: &JobApplicationStatus,
        application: &JobApplication,
    ) -> Result<()>;

    async fn find_by_student(&self, student_id: &StudentId) -> Result<Vec<JobApplication>>;

    async fn find_by_company(
        &self,
        company_id: &CompanyId,
        posting_id: Option<&JobPostingId>,
        statuses: Option<&[JobApplicationStatus]>,
    ) -> Result<Vec<JobApplication>>;
}
