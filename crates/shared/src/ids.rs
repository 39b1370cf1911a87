// Typed identifiers shared across bounded contexts

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn from_string(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an admission application (course track)
    ApplicationId
);
uuid_id!(
    /// Identifier of a job application
    JobApplicationId
);
uuid_id!(
    /// Identifier of a student account
    StudentId
);
uuid_id!(
    /// Identifier of a course offered by an institution
    CourseId
);
uuid_id!(
    /// Identifier of an institution
    InstitutionId
);
uuid_id!(
    /// Identifier of a job posting
    JobPostingId
);
uuid_id!(
    /// Identifier of a company
    CompanyId
);
uuid_id!(
    /// Identifier of a platform user acting as reviewer or admin
    UserId
);
uuid_id!(
    /// Correlation identifier for tracing related operations
    CorrelationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_id_creation() {
        let id = ApplicationId::new();
        assert!(!id.0.is_nil());
    }

    #[test]
    fn test_application_id_display_is_uuid() {
        let id = ApplicationId::new();
        let display = format!("{}", id);
        assert_eq!(display.len(), 36);
    }

    #[test]
    fn test_id_equality_by_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(StudentId(uuid), StudentId(uuid));
        assert_ne!(StudentId::new(), StudentId::new());
    }

    #[test]
    fn test_id_from_string_roundtrip() {
        let id = CourseId::new();
        let parsed = CourseId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(CourseId::from_string("not-a-uuid").is_none());
    }
}
