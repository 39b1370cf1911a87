//! Request context propagation
//!
//! Carries the verified caller identity and a correlation id through every
//! lifecycle call. The authorization collaborator verifies the caller before
//! the core is invoked; the core trusts these values but still checks
//! ownership against the targeted record. There is no ambient or global
//! caller state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared_kernel::*;

/// Verified caller identity and role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Caller {
    Student(StudentId),
    Institution {
        institution_id: InstitutionId,
        reviewer_id: UserId,
    },
    Company {
        company_id: CompanyId,
        reviewer_id: UserId,
    },
    Admin(UserId),
}

impl Caller {
    /// Reviewer identity to stamp on records, absent for students
    pub fn reviewer_id(&self) -> Option<UserId> {
        match self {
            Caller::Student(_) => None,
            Caller::Institution { reviewer_id, .. } | Caller::Company { reviewer_id, .. } => {
                Some(*reviewer_id)
            }
            Caller::Admin(user_id) => Some(*user_id),
        }
    }

    /// Stable label for audit fields on events
    pub fn label(&self) -> String {
        match self {
            Caller::Student(id) => format!("student:{}", id),
            Caller::Institution { institution_id, .. } => {
                format!("institution:{}", institution_id)
            }
            Caller::Company { company_id, .. } => format!("company:{}", company_id),
            Caller::Admin(id) => format!("admin:{}", id),
        }
    }
}

/// Immutable per-request context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    caller: Caller,
    correlation_id: String,
    started_at: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context with a generated correlation id
    pub fn new(caller: Caller) -> Self {
        Self {
            caller,
            correlation_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
        }
    }

    /// Creates a context propagating an upstream correlation id
    pub fn with_correlation_id(caller: Caller, correlation_id: impl Into<String>) -> Self {
        Self {
            caller,
            correlation_id: correlation_id.into(),
            started_at: Utc::now(),
        }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn correlation_id_owned(&self) -> Option<String> {
        Some(self.correlation_id.clone())
    }

    pub fn actor_owned(&self) -> Option<String> {
        Some(self.caller.label())
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
