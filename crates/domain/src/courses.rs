//! Course reference data
//!
//! Courses are owned by the catalog service; the lifecycle engine reads them
//! through the `CourseDirectory` port and never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared_kernel::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub institution_id: InstitutionId,
    pub name: String,
    /// Capacity, informational for publishing (never enforced)
    pub seats: u32,
    pub application_deadline: DateTime<Utc>,
    pub status: CourseStatus,
    pub requirements: Vec<String>,
}

/// Read port for course reference data
#[async_trait::async_trait]
pub trait CourseDirectory: Send + Sync {
    async fn find_by_id(&self, course_id: &CourseId) -> Result<Option<Course>>;
}
