//! PostgreSQL admission application repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};
use std::str::FromStr;

use campus_domain::applications::{Application, ApplicationRepository};
use campus_domain::shared_kernel::{
    ApplicationId, ApplicationStatus, CourseId, DomainError, InstitutionId, Result, StudentId,
    UserId,
};

/// PostgreSQL application store
///
/// The (student, course) uniqueness guard is a partial unique index over
/// non-withdrawn rows, so concurrent submissions get at-most-one-winner
/// semantics from the database itself.
#[derive(Clone)]
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the applications table and its indexes
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id UUID PRIMARY KEY,
                student_id UUID NOT NULL,
                course_id UUID NOT NULL,
                institution_id UUID NOT NULL,
                status VARCHAR(50) NOT NULL,
                personal_statement TEXT NOT NULL,
                documents JSONB NOT NULL DEFAULT '[]',
                applied_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                reviewed_by UUID,
                reviewed_at TIMESTAMPTZ,
                notes TEXT,
                admitted_at TIMESTAMPTZ,
                published BOOLEAN NOT NULL DEFAULT FALSE,
                withdrawn_at TIMESTAMPTZ
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create applications table: {}", e),
        })?;

        // The store-level uniqueness backstop: one non-withdrawn application
        // per (student, course)
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS uq_applications_student_course_live
            ON applications(student_id, course_id)
            WHERE status <> 'WITHDRAWN';
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create uniqueness index: {}", e),
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_applications_student ON applications(student_id);",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create student index: {}", e),
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_applications_institution_course
             ON applications(institution_id, course_id, status);",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to create institution index: {}", e),
        })?;

        Ok(())
    }

    fn row_to_application(row: &PgRow) -> Result<Application> {
        let status_raw: String = row.get("status");
        let status = ApplicationStatus::from_str(&status_raw).map_err(|e| {
            DomainError::InfrastructureError {
                message: format!("Corrupt status column: {}", e),
            }
        })?;

        let documents_json: serde_json::Value = row.get("documents");
        let documents = serde_json::from_value(documents_json).map_err(|e| {
            DomainError::InfrastructureError {
                message: format!("Failed to deserialize documents: {}", e),
            }
        })?;

        Ok(Application {
            id: ApplicationId(row.get("id")),
            student_id: StudentId(row.get("student_id")),
            course_id: CourseId(row.get("course_id")),
            institution_id: InstitutionId(row.get("institution_id")),
            status,
            personal_statement: row.get("personal_statement"),
            documents,
            applied_at: row.get("applied_at"),
            updated_at: row.get("updated_at"),
            reviewed_by: row
                .get::<Option<uuid::Uuid>, _>("reviewed_by")
                .map(UserId),
            reviewed_at: row.get("reviewed_at"),
            notes: row.get("notes"),
            admitted_at: row.get("admitted_at"),
            published: row.get("published"),
            withdrawn_at: row.get("withdrawn_at"),
        })
    }

    fn status_filter(statuses: Option<&[ApplicationStatus]>) -> Option<Vec<String>> {
        statuses.map(|list| list.iter().map(|s| s.to_string()).collect())
    }
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn create(&self, application: &Application) -> Result<()> {
        let documents_json = serde_json::to_value(&application.documents).map_err(|e| {
            DomainError::InfrastructureError {
                message: format!("Failed to serialize documents: {}", e),
            }
        })?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO applications
                (id, student_id, course_id, institution_id, status,
                 personal_statement, documents, applied_at, updated_at,
                 reviewed_by, reviewed_at, notes, admitted_at, published, withdrawn_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, NULL, NULL, NULL, NULL, FALSE, NULL)
            "#,
        )
        .bind(application.id.0)
        .bind(application.student_id.0)
        .bind(application.course_id.0)
        .bind(application.institution_id.0)
        .bind(application.status.to_string())
        .bind(&application.personal_statement)
        .bind(documents_json)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DomainError::DuplicateApplication {
                    student_id: application.student_id,
                    course_id: application.course_id,
                })
            }
            Err(e) => Err(DomainError::InfrastructureError {
                message: format!("Failed to create application: {}", e),
            }),
        }
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::InfrastructureError {
                message: format!("Failed to load application: {}", e),
            })?;

        row.as_ref().map(Self::row_to_application).transpose()
    }

    async fn update(&self, application: &Application) -> Result<()> {
        let documents_json = serde_json::to_value(&application.documents).map_err(|e| {
            DomainError::InfrastructureError {
                message: format!("Failed to serialize documents: {}", e),
            }
        })?;

        let result = sqlx::query(
            r#"
            UPDATE applications SET
                status = $2,
                personal_statement = $3,
                documents = $4,
                updated_at = NOW(),
                reviewed_by = $5,
                reviewed_at = $6,
                notes = $7,
                admitted_at = $8,
                published = $9,
                withdrawn_at = $10
            WHERE id = $1
            "#,
        )
        .bind(application.id.0)
        .bind(application.status.to_string())
        .bind(&application.personal_statement)
        .bind(documents_json)
        .bind(application.reviewed_by.map(|r| r.0))
        .bind(application.reviewed_at)
        .bind(&application.notes)
        .bind(application.admitted_at)
        .bind(application.published)
        .bind(application.withdrawn_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to update application: {}", e),
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ApplicationNotFound {
                application_id: application.id,
            });
        }
        Ok(())
    }

    async fn update_status(
        &self,
        expected: &ApplicationStatus,
        application: &Application,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE applications SET
                status = $3,
                updated_at = NOW(),
                reviewed_by = $4,
                reviewed_at = $5,
                notes = $6,
                admitted_at = $7,
                withdrawn_at = $8
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(application.id.0)
        .bind(expected.to_string())
        .bind(application.status.to_string())
        .bind(application.reviewed_by.map(|r| r.0))
        .bind(application.reviewed_at)
        .bind(&application.notes)
        .bind(application.admitted_at)
        .bind(application.withdrawn_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to update application status: {}", e),
        })?;

        if result.rows_affected() == 0 {
            // Distinguish a vanished row from a concurrent status change
            let exists = sqlx::query("SELECT 1 FROM applications WHERE id = $1")
                .bind(application.id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::InfrastructureError {
                    message: format!("Failed to check application existence: {}", e),
                })?;

            return match exists {
                Some(_) => Err(DomainError::Conflict),
                None => Err(DomainError::ApplicationNotFound {
                    application_id: application.id,
                }),
            };
        }
        Ok(())
    }

    async fn find_by_student(
        &self,
        student_id: &StudentId,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>> {
        let filter = Self::status_filter(statuses);
        let rows = sqlx::query(
            r#"
            SELECT * FROM applications
            WHERE student_id = $1
              AND ($2::text[] IS NULL OR status = ANY($2))
            ORDER BY applied_at DESC
            "#,
        )
        .bind(student_id.0)
        .bind(filter)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to query applications by student: {}", e),
        })?;

        rows.iter().map(Self::row_to_application).collect()
    }

    async fn find_by_institution(
        &self,
        institution_id: &InstitutionId,
        course_id: Option<&CourseId>,
        statuses: Option<&[ApplicationStatus]>,
    ) -> Result<Vec<Application>> {
        let filter = Self::status_filter(statuses);
        let rows = sqlx::query(
            r#"
            SELECT * FROM applications
            WHERE institution_id = $1
              AND ($2::uuid IS NULL OR course_id = $2)
              AND ($3::text[] IS NULL OR status = ANY($3))
            ORDER BY applied_at DESC
            "#,
        )
        .bind(institution_id.0)
        .bind(course_id.map(|c| c.0))
        .bind(filter)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to query applications by institution: {}", e),
        })?;

        rows.iter().map(Self::row_to_application).collect()
    }

    async fn publish_cohort(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
        now: DateTime<Utc>,
    ) -> Result<u32> {
        let mut tx =
            self.pool
                .begin()
                .await
                .map_err(|e| DomainError::InfrastructureError {
                    message: format!("Failed to open publish transaction: {}", e),
                })?;

        let result = sqlx::query(
            r#"
            UPDATE applications SET
                published = TRUE,
                admitted_at = COALESCE(admitted_at, $3),
                updated_at = $3
            WHERE institution_id = $1
              AND course_id = $2
              AND status = 'ACCEPTED'
              AND published = FALSE
            "#,
        )
        .bind(institution_id.0)
        .bind(course_id.0)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to publish cohort: {}", e),
        })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::InfrastructureError {
                message: format!("Failed to commit publish transaction: {}", e),
            })?;

        Ok(result.rows_affected() as u32)
    }

    async fn count_published(
        &self,
        institution_id: &InstitutionId,
        course_id: &CourseId,
    ) -> Result<u32> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS published_total FROM applications
            WHERE institution_id = $1 AND course_id = $2 AND published = TRUE
            "#,
        )
        .bind(institution_id.0)
        .bind(course_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::InfrastructureError {
            message: format!("Failed to count published applications: {}", e),
        })?;

        let count: i64 = row.get("published_total");
        Ok(count as u32)
    }
}
