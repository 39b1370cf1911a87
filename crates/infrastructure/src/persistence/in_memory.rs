//! In-memory repositories
//!
//! Fast, isolated implementations of the persistence ports backed by
//! `RwLock<HashMap>`. Used by the test suites and local runs; the semantics
//! (uniqueness guard, CAS, atomic publish) mirror the PostgreSQL store.
//!
//! Locks are acquired and released inside each call; nothing is held across
//! an await point.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use campus_domain::applications::{
    Application, ApplicationRepository, JobApplication, JobApplicationRepository,
};
use campus_domain::courses::{Course, CourseDirectory};
use campus_domain::shared_kernel::{
    ApplicationId, ApplicationStatus, CompanyId, CourseId, DomainError, InstitutionId,
    JobApplicationId, JobApplicationStatus, JobPostingId, Result, StudentId,
};

/// In-memory admission application store
#[derive(Clone, Default)]
pub struct InMemoryApplicationRepository {
    rows: Arc<RwLock<HashMap<ApplicationId, Application>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: make every subsequent write fail before applying,
    /// simulating an unavailable store.
    pub fn inject_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write_failure(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::InfrastructureError {
                message: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, application: &Application) -> Result<()> {
        self.check_write_failure()?;
        let mut rows = self.rows.write().await;

        // Uniqueness guard: one non-withdrawn application per (student, course).
        // The scan runs under the same write lock as the insert, which gives
        // the at-most-one-winner semantics a real database gets from a
        // partial unique index.
        let duplicate = rows.values().any(|existing| {
            existing.student_id == application.student_id
                && existing.course_id == application.course_id
                && existing.status != ApplicationStatus::Withdrawn
        });
        if duplicate {
            return Err(DomainError::DuplicateApplication {
                student_id: application.student_id,
                course_id: application.course_id,
            });
        }

        let mut stored = application.clone();
        let now = Utc::now();
        stored.applied_at = now;
        stored.updated_at = now;
        rows.insert(stored.id, stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn update(&self, application: &Application) -> Result<()> {
        self.check_write_failure()?;
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&application.id) {
            return Err(DomainError::ApplicationNotFound {
                application_id: application.id,
            });
        }
        let mut stored = application.clone();
        stored.updated_at = Utc::now();
        rows.insert(stored.id, stored);
        Ok(())
    }

    async fn update_status(
        &self,
        expected: &ApplicationStatus,
        application: &Application,
    ) -> Result<()> {
        self.check_write_failure()?;
        let mut rows = self.rows.write().await;
        let current = rows.get(&application.id).ok_or(
            DomainError::ApplicationNotFound {
                application_id: application.id,
            },
        )?;

        if current.status != *expected {
            return Err(DomainError::Conflict);
        }

        rows.insert(application.id, application.clone());
        Ok(())
    }

    async fn find_by_student(
        &self,
        student_id: &StudentId,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>> {
        let rows = self.rows.read().await;
        let mut found: Vec<Application> = rows
            .values()
            .filter(|app| app.student_id == *student_id)
            .filter(|app| statuses.map_or(true, |wanted| wanted.contains(&app.status)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(found)
    }

    async fn find_by_institution(
        &self,
        institution_id: &InstitutionId,
        course_id: Option<&CourseId>,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>> {
        let rows = self.rows.read().await;
        let mut found: Vec<Application> = rows
            .values()
            .filter(|app| app.institution_id == *institution_id)
            .filter(|app| course_id.map_or(true, |course| app.course_id == *course))
            .filter(|app| statuses.map_or(true, |wanted| wanted.contains(&app.status)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(found)
    }

    async fn publish_cohort(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
        now: DateTime<Utc>,
    ) -> Result<u32> {
        let mut rows = self.rows.write().await;

        // Stage the whole batch first, then commit under the same lock.
        // A failure before the commit leaves every row untouched.
        let mut staged: Vec<Application> = rows
            .values()
            .filter(|app| {
                app.institution_id == *institution_id
                    && app.course_id == *course_id
                    && app.status == ApplicationStatus::Accepted
                    && !app.published
            })
            .cloned()
            .collect();

        self.check_write_failure()?;

        let count = staged.len() as u32;
        for app in staged.iter_mut() {
            app.published = true;
            if app.admitted_at.is_none() {
                app.admitted_at = Some(now);
            }
            app.updated_at = now;
        }
        for app in staged {
            rows.insert(app.id, app);
        }
        Ok(count)
    }

    async fn count_published(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
    ) -> Result<u32> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|app| {
                app.institution_id == *institution_id
                    && app.course_id == *course_id
                    && app.published
            })
            .count() as u32)
    }
}

/// In-memory job application store
#[derive(Clone, Default)]
pub struct InMemoryJobApplicationRepository {
    rows: Arc<RwLock<HashMap<JobApplicationId, JobApplication>>>,
}

impl InMemoryJobApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobApplicationRepository for InMemoryJobApplicationRepository {
    async fn create(&self, application: &JobApplication) -> Result<()> {
        let mut rows = self.rows.write().await;

        let duplicate = rows.values().any(|existing| {
            existing.student_id == application.student_id
                && existing.posting_id == application.posting_id
                && existing.status != JobApplicationStatus::Withdrawn
        });
        if duplicate {
            return Err(DomainError::DuplicateJobApplication {
                student_id: application.student_id,
                posting_id: application.posting_id,
            });
        }

        let mut stored = application.clone();
        let now = Utc::now();
        stored.applied_at = now;
        stored.updated_at = now;
        rows.insert(stored.id, stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &JobApplicationId) -> Result<Option<JobApplication>> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn update_status(
        &self,
        expected: &JobApplicationStatus,
        application: &JobApplication,
    ) -> Result<()> {
        let mut rows = self.rows.write().await;
        let current = rows.get(&application.id).ok_or(
            DomainError::JobApplicationNotFound {
                job_application_id: application.id,
            },
        )?;

        if current.status != *expected {
            return Err(DomainError::Conflict);
        }

        rows.insert(application.id, application.clone());
        Ok(())
    }

    async fn find_by_student(&self, student_id: &StudentId) -> Result<Vec<JobApplication>> {
        let rows = self.rows.read().await;
        let mut found: Vec<JobApplication> = rows
            .values()
            .filter(|app| app.student_id == *student_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(found)
    }

    async fn find_by_company(
        &self,
        company_id: &CompanyId,
        posting_id: Option<&JobPostingId>,
        statuses: Option<&[JobApplicationStatus]>,
    ) -> Result<Vec<JobApplication>> {
        let rows = self.rows.read().await;
        let mut found: Vec<JobApplication> = rows
            .values()
            .filter(|app| app.company_id == *company_id)
            .filter(|app| posting_id.map_or(true, |posting| app.posting_id == *posting))
            .filter(|app| statuses.map_or(true, |wanted| wanted.contains(&app.status)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(found)
    }
}

/// In-memory course directory for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryCourseDirectory {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
}

impl InMemoryCourseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, course: Course) {
        self.courses.write().await.insert(course.id, course);
    }
}

#[async_trait]
impl CourseDirectory for InMemoryCourseDirectory {
    async fn find_by_id(&self, course_id: &CourseId) -> Result<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(course_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_domain::applications::Application;
    use campus_domain::shared_kernel::UserId;

    fn application_for(
        student_id: StudentId,
        course_id: CourseId,
        institution_id: InstitutionId,
    ) -> Application {
        Application::new(
            student_id,
            course_id,
            institution_id,
            "statement".to_string(),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_live_application() {
        let repo = InMemoryApplicationRepository::new();
        let student = StudentId::new();
        let course = CourseId::new();
        let institution = InstitutionId::new();

        repo.create(&application_for(student, course, institution))
            .await
            .unwrap();

        let err = repo
            .create(&application_for(student, course, institution))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateApplication { .. }));
    }

    #[tokio::test]
    async fn test_withdrawn_application_frees_uniqueness_slot() {
        let repo = InMemoryApplicationRepository::new();
        let student = StudentId::new();
        let course = CourseId::new();
        let institution = InstitutionId::new();

        let mut app = application_for(student, course, institution);
        repo.create(&app).await.unwrap();
        app.transition_to(ApplicationStatus::Withdrawn, None, None, Utc::now())
            .unwrap();
        repo.update_status(&ApplicationStatus::Pending, &app)
            .await
            .unwrap();

        // same (student, course) may apply again after withdrawal
        repo.create(&application_for(student, course, institution))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status_detects_concurrent_change() {
        let repo = InMemoryApplicationRepository::new();
        let mut app = application_for(StudentId::new(), CourseId::new(), InstitutionId::new());
        repo.create(&app).await.unwrap();

        app.transition_to(
            ApplicationStatus::Accepted,
            Some(UserId::new()),
            None,
            Utc::now(),
        )
        .unwrap();
        repo.update_status(&ApplicationStatus::Pending, &app)
            .await
            .unwrap();

        // A second writer that also read Pending must not overwrite the
        // committed decision
        let err = repo
            .update_status(&ApplicationStatus::Pending, &app)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict));
    }

    #[tokio::test]
    async fn test_publish_cohort_is_idempotent() {
        let repo = InMemoryApplicationRepository::new();
        let institution = InstitutionId::new();
        let course = CourseId::new();
        let now = Utc::now();

        for _ in 0..3 {
            let mut app = application_for(StudentId::new(), course, institution);
            repo.create(&app).await.unwrap();
            app.transition_to(ApplicationStatus::Accepted, Some(UserId::new()), None, now)
                .unwrap();
            repo.update_status(&ApplicationStatus::Pending, &app)
                .await
                .unwrap();
        }

        let first = repo.publish_cohort(&institution, &course, now).await.unwrap();
        assert_eq!(first, 3);
        let second = repo.publish_cohort(&institution, &course, now).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(repo.count_published(&institution, &course).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_publish_cohort_leaves_non_accepted_rows_untouched() {
        let repo = InMemoryApplicationRepository::new();
        let institution = InstitutionId::new();
        let course = CourseId::new();
        let now = Utc::now();

        let mut accepted = application_for(StudentId::new(), course, institution);
        repo.create(&accepted).await.unwrap();
        accepted
            .transition_to(ApplicationStatus::Accepted, Some(UserId::new()), None, now)
            .unwrap();
        repo.update_status(&ApplicationStatus::Pending, &accepted)
            .await
            .unwrap();

        let mut rejected = application_for(StudentId::new(), course, institution);
        repo.create(&rejected).await.unwrap();
        rejected
            .transition_to(ApplicationStatus::Rejected, Some(UserId::new()), None, now)
            .unwrap();
        repo.update_status(&ApplicationStatus::Pending, &rejected)
            .await
            .unwrap();

        let pending = application_for(StudentId::new(), course, institution);
        repo.create(&pending).await.unwrap();

        let flipped = repo.publish_cohort(&institution, &course, now).await.unwrap();
        assert_eq!(flipped, 1);

        let rejected = repo.find_by_id(&rejected.id).await.unwrap().unwrap();
        assert!(!rejected.published);
        assert!(rejected.admitted_at.is_none());
        let pending = repo.find_by_id(&pending.id).await.unwrap().unwrap();
        assert!(!pending.published);
        assert!(pending.admitted_at.is_none());
    }

    #[tokio::test]
    async fn test_publish_cohort_does_not_overwrite_admitted_at() {
        let repo = InMemoryApplicationRepository::new();
        let institution = InstitutionId::new();
        let course = CourseId::new();
        let accepted_at = Utc::now();

        let mut app = application_for(StudentId::new(), course, institution);
        repo.create(&app).await.unwrap();
        app.transition_to(
            ApplicationStatus::Accepted,
            Some(UserId::new()),
            None,
            accepted_at,
        )
        .unwrap();
        repo.update_status(&ApplicationStatus::Pending, &app)
            .await
            .unwrap();

        let publish_time = accepted_at + chrono::Duration::hours(1);
        repo.publish_cohort(&institution, &course, publish_time)
            .await
            .unwrap();

        let stored = repo.find_by_id(&app.id).await.unwrap().unwrap();
        assert!(stored.published);
        assert_eq!(stored.admitted_at, Some(accepted_at));
    }

    #[tokio::test]
    async fn test_publish_cohort_atomic_under_injected_failure() {
        let repo = InMemoryApplicationRepository::new();
        let institution = InstitutionId::new();
        let course = CourseId::new();
        let now = Utc::now();

        for _ in 0..3 {
            let mut app = application_for(StudentId::new(), course, institution);
            repo.create(&app).await.unwrap();
            app.transition_to(ApplicationStatus::Accepted, Some(UserId::new()), None, now)
                .unwrap();
            repo.update_status(&ApplicationStatus::Pending, &app)
                .await
                .unwrap();
        }

        repo.inject_write_failure(true);
        let err = repo.publish_cohort(&institution, &course, now).await.unwrap_err();
        assert!(matches!(err, DomainError::InfrastructureError { .. }));

        repo.inject_write_failure(false);
        // No partial cohort is observable
        assert_eq!(repo.count_published(&institution, &course).await.unwrap(), 0);
        let accepted = repo
            .find_by_institution(&institution, Some(&course), None)
            .await
            .unwrap();
        assert!(accepted.iter().all(|app| !app.published));
    }

    #[tokio::test]
    async fn test_job_application_duplicate_guard() {
        let repo = InMemoryJobApplicationRepository::new();
        let student = StudentId::new();
        let posting = JobPostingId::new();
        let company = CompanyId::new();

        repo.create(&JobApplication::new(student, posting, company))
            .await
            .unwrap();
        let err = repo
            .create(&JobApplication::new(student, posting, company))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateJobApplication { .. }));
    }
}
