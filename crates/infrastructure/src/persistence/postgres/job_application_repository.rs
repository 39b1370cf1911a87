//! PostgreSQL job application repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};
use std::str::FromStr;

use campus_domain::applications::{JobApplication, JobApplicationRepository};
use campus_domain::shared_kernel::{
    CompanyId, DomainError, JobApplicationId, JobApplicationStatus, JobPostingId, Result,
    StudentId, UserId,
};

/// PostgreSQL job application store, same uniqueness strategy as the
/// course track (partial unique index over non-withdrawn rows)
#[derive(Clone)]
pub struct PostgresJobApplicationRepository {
    pool: PgPool,
}

impl PostgresJobApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_applications (
                id UUID PRIMARY KEY,
                student_id UUID NOT NULL,
                posting_id UUID NOT NULL,
                company_id UUID NOT NULL,
                status VARCHAR(50) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                interview_at TIMESTAMPTZ,
                offer_note TEXT,
                reviewed_by UUID,
                reviewed_at TIMESTAMPTZ,
                withdrawn_at TIMESTAMPTZ
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create job_applications table: {}", e),
        })?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS uq_job_applications_student_posting_live
            ON job_applications(student_id, posting_id)
            WHERE status <> 'WITHDRAWN';
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create job uniqueness index: {}", e),
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_job_applications_company
             ON job_applications(company_id, posting_id, status);",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create company index: {}", e),
        })?;

        Ok(())
    }

    fn row_to_job_application(row: &PgRow) -> Result<JobApplication> {
        let status_raw: String = row.get("status");
        let status = JobApplicationStatus::from_str(&status_raw).map_err(|e| {
            DomainError::InfrastructureError {
                message: format!("Corrupt status column: {}", e),
            }
        })?;

        Ok(JobApplication {
            id: JobApplicationId(row.get("id")),
            student_id: StudentId(row.get("student_id")),
            posting_id: JobPostingId(row.get("posting_id")),
            company_id: CompanyId(row.get("company_id")),
            status,
            applied_at: row.get("applied_at"),
            updated_at: row.get("updated_at"),
            interview_at: row.get("interview_at"),
            offer_note: row.get("offer_note"),
            reviewed_by: row
                .get::<Option<uuid::Uuid>, _>("reviewed_by")
                .map(UserId),
            reviewed_at: row.get("reviewed_at"),
            withdrawn_at: row.get("withdrawn_at"),
        })
    }
}

#[async_trait]
impl JobApplicationRepository for PostgresJobApplicationRepository {
    async fn create(&self, application: &JobApplication) -> Result<()> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO job_applications
                (id, student_id, posting_id, company_id, status, applied_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(application.id.0)
        .bind(application.student_id.0)
        .bind(application.posting_id.0)
        .bind(application.company_id.0)
        .bind(application.status.to_string())
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DomainError::DuplicateJobApplication {
                    student_id: application.student_id,
                    posting_id: application.posting_id,
                })
            }
            Err(e) => Err(DomainError::InfrastructureError {
                message: format!("Failed to create job application: {}", e),
            }),
        }
    }

    async fn find_by_id(&self, id: &JobApplicationId) -> Result<Option<JobApplication>> {
        let row = sqlx::query("SELECT * FROM job_applications WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::InfrastructureError {
                message: format!("Failed to load job application: {}", e),
            })?;

        row.as_ref().map(Self::row_to_job_application).transpose()
    }

    async fn update_status(
        &self,
        expected: &JobApplicationStatus,
        application: &JobApplication,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE job_applications SET
                status = $3,
                updated_at = NOW(),
                interview_at = $4,
                offer_note = $5,
                reviewed_by = $6,
                reviewed_at = $7,
                withdrawn_at = $8
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(application.id.0)
        .bind(expected.to_string())
        .bind(application.status.to_string())
        .bind(application.interview_at)
        .bind(&application.offer_note)
        .bind(application.reviewed_by.map(|r| r.0))
        .bind(application.reviewed_at)
        .bind(application.withdrawn_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to update job application status: {}", e),
        })?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM job_applications WHERE id = $1")
                .bind(application.id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::InfrastructureError {
                    message: format!("Failed to check job application existence: {}", e),
                })?;

            return match exists {
                Some(_) => Err(DomainError::Conflict),
                None => Err(DomainError::JobApplicationNotFound {
                    job_application_id: application.id,
                }),
            };
        }
        Ok(())
    }

    async fn find_by_student(&self, student_id: &StudentId) -> Result<Vec<JobApplication>> {
        let rows = sqlx::query(
            "SELECT * FROM job_applications WHERE student_id = $1 ORDER BY applied_at DESC",
        )
        .bind(student_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to query job applications by student: {}", e),
        })?;

        rows.iter().map(Self::row_to_job_application).collect()
    }

    async fn find_by_company(
        &self,
        company_id: &CompanyId,
        posting_id: Option<&JobPostingId>,
        statuses: Option<&[JobApplicationStatus]>,
    ) -> Result<Vec<JobApplication>> {
        let filter: Option<Vec<String>> =
            statuses.map(|list| list.iter().map(|s| s.to_string()).collect());
        let rows = sqlx::query(
            r#"
            SELECT * FROM job_applications
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR posting_id = $2)
              AND ($3::text[] IS NULL OR status = ANY($3))
            ORDER BY applied_at DESC
            "#,
        )
        .bind(company_id.0)
        .bind(posting_id.map(|p| p.0))
        .bind(filter)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to query job applications by company: {}", e),
        })?;

        rows.iter().map(Self::row_to_job_application).collect()
    }
}
