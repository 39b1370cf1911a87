//! Caller-scoped read projections over the application store
//!
//! Every query re-checks that the caller owns the slice it asks for; there
//! is no admin-wide listing except through the admin role itself.

use std::sync::Arc;

use campus_domain::applications::{
    Application, ApplicationRepository, JobApplication, JobApplicationRepository,
};
use campus_domain::request_context::{Caller, RequestContext};
use campus_domain::shared_kernel::{
    ApplicationStatus, CompanyId, CourseId, DomainError, InstitutionId, JobApplicationStatus,
    JobPostingId, Result, StudentId,
};

pub struct ApplicationQueries {
    applications: Arc<dyn ApplicationRepository>,
    job_applications: Arc<dyn JobApplicationRepository>,
}

impl ApplicationQueries {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        job_applications: Arc<dyn JobApplicationRepository>,
    ) -> Self {
        Self {
            applications,
            job_applications,
        }
    }

    /// A student's own admission applications, newest first
    pub async fn applications_for_student(
        &self,
        student_id: &StudentId,
        statuses: Option<&[ApplicationStatus]>,
        context: &RequestContext,
    ) -> Result<Vec<Application>> {
        match context.caller() {
            Caller::Student(caller_id) if caller_id == student_id => {}
            Caller::Admin(_) => {}
            _ => return Err(DomainError::Unauthorized),
        }
        self.applications.find_by_student(student_id, statuses).await
    }

    /// The review queue for one institution, optionally narrowed to a course
    pub async fn applications_for_institution(
        &self,
        institution_id: &InstitutionId,
        course_id: Option<&CourseId>,
        statuses: Option<&[ApplicationStatus]>,
        context: &RequestContext,
    ) -> Result<Vec<Application>> {
        match context.caller() {
            Caller::Institution {
                institution_id: caller_id,
                ..
            } if caller_id == institution_id => {}
            Caller::Admin(_) => {}
            _ => return Err(DomainError::Unauthorized),
        }
        self.applications
            .find_by_institution(institution_id, course_id, statuses)
            .await
    }

    /// A student's own job applications, newest first
    pub async fn job_applications_for_student(
        &self,
        student_id: &StudentId,
        context: &RequestContext,
    ) -> Result<Vec<JobApplication>> {
        match context.caller() {
            Caller::Student(caller_id) if caller_id == student_id => {}
            Caller::Admin(_) => {}
            _ => return Err(DomainError::Unauthorized),
        }
        self.job_applications.find_by_student(student_id).await
    }

    /// A company's inbound job applications, optionally narrowed to a posting
    pub async fn job_applications_for_company(
        &self,
        company_id: &CompanyId,
        posting_id: Option<&JobPostingId>,
        statuses: Option<&[JobApplicationStatus]>,
        context: &RequestContext,
    ) -> Result<Vec<JobApplication>> {
        match context.caller() {
            Caller::Company {
                company_id: caller_id,
                ..
            } if caller_id == company_id => {}
            Caller::Admin(_) => {}
            _ => return Err(DomainError::Unauthorized),
        }
        self.job_applications
            .find_by_company(company_id, posting_id, statuses)
            .await
    }
}
