//! Retrying store decorators
//!
//! Wrap a persistence port so transient `InfrastructureError`s are retried
//! with exponential backoff before surfacing. Business-rule failures and
//! `Conflict` pass through on the first attempt; conflicts carry fresh-state
//! semantics the caller must re-read, so retrying them here would be wrong.
//!
//! Every wrapped operation is safe to re-issue: `create` is guarded by the
//! store uniqueness constraint and `publish_cohort` is idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campus_domain::applications::{
    Application, ApplicationRepository, JobApplication, JobApplicationRepository,
};
use campus_domain::shared_kernel::{
    ApplicationId, ApplicationStatus, CompanyId, CourseId, InstitutionId, JobApplicationId,
    JobApplicationStatus, JobPostingId, Result, StudentId,
};

use crate::retry::{with_retries, BackoffConfig};

/// Admission application store with backoff retries at the call boundary
#[derive(Clone)]
pub struct RetryingApplicationRepository {
    inner: Arc<dyn ApplicationRepository>,
    backoff: BackoffConfig,
}

impl RetryingApplicationRepository {
    pub fn new(inner: Arc<dyn ApplicationRepository>, backoff: BackoffConfig) -> Self {
        Self { inner, backoff }
    }
}

#[async_trait]
impl ApplicationRepository for RetryingApplicationRepository {
    async fn create(&self, application: &Application) -> Result<()> {
        with_retries(&self.backoff, || self.inner.create(application)).await
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>> {
        with_retries(&self.backoff, || self.inner.find_by_id(id)).await
    }

    async fn update(&self, application: &Application) -> Result<()> {
        with_retries(&self.backoff, || self.inner.update(application)).await
    }

    async fn update_status(
        &self,
        expected: &ApplicationStatus,
        application: &Application,
    ) -> Result<()> {
        with_retries(&self.backoff, || {
            self.inner.update_status(expected, application)
        })
        .await
    }

    async fn find_by_student(
        &self,
        student_id: &StudentId,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>> {
        with_retries(&self.backoff, || {
            self.inner.find_by_student(student_id, statuses)
        })
        .await
    }

    async fn find_by_institution(
        &self,
        institution_id: &InstitutionId,
        course_id: Option<&CourseId>,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>> {
        with_retries(&self.backoff, || {
            self.inner
                .find_by_institution(institution_id, course_id, statuses)
        })
        .await
    }

    async fn publish_cohort(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
        now: DateTime<Utc>,
    ) -> Result<u32> {
        with_retries(&self.backoff, || {
            self.inner.publish_cohort(institution_id, course_id, now)
        })
        .await
    }

    async fn count_published(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
    ) -> Result<u32> {
        with_retries(&self.backoff, || {
            self.inner.count_published(institution_id, course_id)
        })
        .await
    }
}

/// Job application store with backoff retries at the call boundary
#[derive(Clone)]
pub struct RetryingJobApplicationRepository {
    inner: Arc<dyn JobApplicationRepository>,
    backoff: BackoffConfig,
}

impl RetryingJobApplicationRepository {
    pub fn new(inner: Arc<dyn JobApplicationRepository>, backoff: BackoffConfig) -> Self {
        Self { inner, backoff }
    }
}

#[async_trait]
impl JobApplicationRepository for RetryingJobApplicationRepository {
    async fn create(&self, application: &JobApplication) -> Result<()> {
        with_retries(&self.backoff, || self.inner.create(application)).await
    }

    async fn find_by_id(&self, id: &JobApplicationId) -> Result<Option<JobApplication>> {
        with_retries(&self.backoff, || self.inner.find_by_id(id)).await
    }

    async fn update_status(
        &self,
        expected: &JobApplicationStatus,
        application: &JobApplication,
    ) -> Result<()> {
        with_retries(&self.backoff, || {
            self.inner.update_status(expected, application)
        })
        .await
    }

    async fn find_by_student(&self, student_id: &StudentId) -> Result<Vec<JobApplication>> {
        with_retries(&self.backoff, || self.inner.find_by_student(student_id)).await
    }

    async fn find_by_company(
        &self,
        company_id: &CompanyId,
        posting_id: Option<&JobPostingId>,
        statuses: Option<&[JobApplicationStatus]>,
    ) -> Result<Vec<JobApplication>> {
        with_retries(&self.backoff, || {
            self.inner.find_by_company(company_id, posting_id, statuses)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use campus_domain::shared_kernel::DomainError;

    use crate::persistence::in_memory::InMemoryApplicationRepository;

    /// Delegates to an in-memory store after failing the first
    /// `failures` calls with a transient error.
    struct FlakyRepository {
        inner: InMemoryApplicationRepository,
        failures_remaining: AtomicU32,
    }

    impl FlakyRepository {
        fn new(failures: u32) -> Self {
            Self {
                inner: InMemoryApplicationRepository::new(),
                failures_remaining: AtomicU32::new(failures),
            }
        }

        fn trip(&self) -> Result<()> {
            loop {
                let remaining = self.failures_remaining.load(Ordering::SeqCst);
                if remaining == 0 {
                    return Ok(());
                }
                if self
                    .failures_remaining
                    .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    return Err(DomainError::InfrastructureError {
                        message: "transient store outage".to_string(),
                    });
                }
            }
        }
    }

    #[async_trait]
    impl ApplicationRepository for FlakyRepository {
        async fn create(&self, application: &Application) -> Result<()> {
            self.trip()?;
            self.inner.create(application).await
        }

        async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>> {
            self.trip()?;
            self.inner.find_by_id(id).await
        }

        async fn update(&self, application: &Application) -> Result<()> {
            self.trip()?;
            self.inner.update(application).await
        }

        async fn update_status(
            &self,
            expected: &ApplicationStatus,
            application: &Application,
        ) -> Result<()> {
            self.trip()?;
            self.inner.update_status(expected, application).await
        }

        async fn find_by_student(
            &self,
            student_id: &StudentId,
            statuses: Option<&[ApplicationStatus]>,
        ) -> Result<Vec<Application>> {
            self.trip()?;
            self.inner.find_by_student(student_id, statuses).await
        }

        async fn find_by_institution(
            &self,
            institution_id: &InstitutionId,
            course_id: Option<&CourseId>,
            statuses: Option<&[ApplicationStatus]>,
        ) -> Result<Vec<Application>> {
            self.trip()?;
            self.inner
                .find_by_institution(institution_id, course_id, statuses)
                .await
        }

        async fn publish_cohort(
            &self,
            institution_id: &InstitutionId,
            course_id: &CourseId,
            now: DateTime<Utc>,
        ) -> Result<u32> {
            self.trip()?;
            self.inner.publish_cohort(institution_id, course_id, now).await
        }

        async fn count_published(
            &self,
            institution_id: &InstitutionId,
            course_id: &CourseId,
        ) -> Result<u32> {
            self.trip()?;
            self.inner.count_published(institution_id, course_id).await
        }
    }

    fn fast_backoff() -> BackoffConfig {
        BackoffConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter_factor: 0.0,
            max_retries: 3,
        }
    }

    fn sample_application() -> Application {
        Application::new(
            StudentId::new(),
            CourseId::new(),
            InstitutionId::new(),
            "statement".to_string(),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_create_recovers_from_transient_outage() {
        let repo =
            RetryingApplicationRepository::new(Arc::new(FlakyRepository::new(2)), fast_backoff());
        let app = sample_application();

        repo.create(&app).await.unwrap();
        assert!(repo.find_by_id(&app.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_outage_longer_than_retry_budget_surfaces() {
        let repo =
            RetryingApplicationRepository::new(Arc::new(FlakyRepository::new(10)), fast_backoff());

        let err = repo.create(&sample_application()).await.unwrap_err();
        assert!(matches!(err, DomainError::InfrastructureError { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_rejection_is_not_retried() {
        let flaky = Arc::new(FlakyRepository::new(0));
        let repo = RetryingApplicationRepository::new(flaky.clone(), fast_backoff());
        let app = sample_application();

        repo.create(&app).await.unwrap();
        let mut again = sample_application();
        again.student_id = app.student_id;
        again.course_id = app.course_id;

        let err = repo.create(&again).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateApplication { .. }));
    }
}
