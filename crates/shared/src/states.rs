use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an admission application (course track)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Interviewed,
    Waitlisted,
    Accepted,
    Rejected,
    Hired,
    Withdrawn,
}

impl ApplicationStatus {
    /// Validates whether a status transition is legal under the admission
    /// state machine.
    ///
    /// Legal transitions:
    /// - Pending → UnderReview, Interviewed, Accepted, Rejected, Hired, Withdrawn
    /// - UnderReview → Interviewed, Waitlisted, Accepted, Rejected, Withdrawn
    /// - Interviewed → Waitlisted, Accepted, Rejected, Withdrawn
    /// - Waitlisted → Accepted, Rejected, Withdrawn
    /// - Accepted → Hired, Withdrawn
    /// - Rejected, Hired, Withdrawn → (terminal, no outgoing transitions)
    pub fn can_transition_to(&self, target: &ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        match (self, target) {
            // Same status is not a transition
            (s, t) if s == t => false,

            (Pending, UnderReview) => true,
            (Pending, Interviewed) => true,
            (Pending, Accepted) => true,
            (Pending, Rejected) => true,
            (Pending, Hired) => true,
            (Pending, Withdrawn) => true,

            (UnderReview, Interviewed) => true,
            (UnderReview, Waitlisted) => true,
            (UnderReview, Accepted) => true,
            (UnderReview, Rejected) => true,
            (UnderReview, Withdrawn) => true,

            (Interviewed, Waitlisted) => true,
            (Interviewed, Accepted) => true,
            (Interviewed, Rejected) => true,
            (Interviewed, Withdrawn) => true,

            (Waitlisted, Accepted) => true,
            (Waitlisted, Rejected) => true,
            (Waitlisted, Withdrawn) => true,

            (Accepted, Hired) => true,
            (Accepted, Withdrawn) => true,

            // Everything else is illegal, including every outgoing edge
            // from Rejected, Hired and Withdrawn
            _ => false,
        }
    }

    /// Returns true if the status has no legal outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Hired | ApplicationStatus::Withdrawn
        )
    }

    /// Returns true if the application still counts toward the
    /// per-institution cap ("live application")
    pub fn counts_toward_cap(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending
                | ApplicationStatus::Accepted
                | ApplicationStatus::Waitlisted
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "PENDING"),
            ApplicationStatus::UnderReview => write!(f, "UNDER_REVIEW"),
            ApplicationStatus::Interviewed => write!(f, "INTERVIEWED"),
            ApplicationStatus::Waitlisted => write!(f, "WAITLISTED"),
            ApplicationStatus::Accepted => write!(f, "ACCEPTED"),
            ApplicationStatus::Rejected => write!(f, "REJECTED"),
            ApplicationStatus::Hired => write!(f, "HIRED"),
            ApplicationStatus::Withdrawn => write!(f, "WITHDRAWN"),
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "UNDER_REVIEW" => Ok(ApplicationStatus::UnderReview),
            "INTERVIEWED" => Ok(ApplicationStatus::Interviewed),
            "WAITLISTED" => Ok(ApplicationStatus::Waitlisted),
            "ACCEPTED" => Ok(ApplicationStatus::Accepted),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            "HIRED" => Ok(ApplicationStatus::Hired),
            "WITHDRAWN" => Ok(ApplicationStatus::Withdrawn),
            _ => Err(format!("Invalid ApplicationStatus: {}", s)),
        }
    }
}

/// Status of a job application (separate, smaller state machine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobApplicationStatus {
    Pending,
    Interview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl JobApplicationStatus {
    /// Legal transitions:
    /// - Pending → Interview, Accepted, Rejected, Withdrawn
    /// - Interview → Accepted, Rejected, Withdrawn
    /// - Accepted, Rejected, Withdrawn → (terminal)
    pub fn can_transition_to(&self, target: &JobApplicationStatus) -> bool {
        use JobApplicationStatus::*;
        match (self, target) {
            (s, t) if s == t => false,

            (Pending, Interview) => true,
            (Pending, Accepted) => true,
            (Pending, Rejected) => true,
            (Pending, Withdrawn) => true,

            (Interview, Accepted) => true,
            (Interview, Rejected) => true,
            (Interview, Withdrawn) => true,

            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobApplicationStatus::Accepted
                | JobApplicationStatus::Rejected
                | JobApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for JobApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobApplicationStatus::Pending => write!(f, "PENDING"),
            JobApplicationStatus::Interview => write!(f, "INTERVIEW"),
            JobApplicationStatus::Accepted => write!(f, "ACCEPTED"),
            JobApplicationStatus::Rejected => write!(f, "REJECTED"),
            JobApplicationStatus::Withdrawn => write!(f, "WITHDRAWN"),
        }
    }
}

impl FromStr for JobApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(JobApplicationStatus::Pending),
            "INTERVIEW" => Ok(JobApplicationStatus::Interview),
            "ACCEPTED" => Ok(JobApplicationStatus::Accepted),
            "REJECTED" => Ok(JobApplicationStatus::Rejected),
            "WITHDRAWN" => Ok(JobApplicationStatus::Withdrawn),
            _ => Err(format!("Invalid JobApplicationStatus: {}", s)),
        }
    }
}

/// Publication status of a course, read-only reference data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    Active,
    Closed,
    Draft,
}

impl CourseStatus {
    pub fn accepts_applications(&self) -> bool {
        matches!(self, CourseStatus::Active)
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseStatus::Active => write!(f, "ACTIVE"),
            CourseStatus::Closed => write!(f, "CLOSED"),
            CourseStatus::Draft => write!(f, "DRAFT"),
        }
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(CourseStatus::Active),
            "CLOSED" => Ok(CourseStatus::Closed),
            "DRAFT" => Ok(CourseStatus::Draft),
            _ => Err(format!("Invalid CourseStatus: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ApplicationStatus; 8] = [
        ApplicationStatus::Pending,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Interviewed,
        ApplicationStatus::Waitlisted,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
        ApplicationStatus::Withdrawn,
    ];

    #[test]
    fn test_application_status_from_str() {
        assert_eq!(
            "PENDING".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Pending
        );
        assert_eq!(
            "UNDER_REVIEW".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::UnderReview
        );
        assert_eq!(
            "WAITLISTED".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Waitlisted
        );
        assert_eq!(
            "WITHDRAWN".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Withdrawn
        );
        assert!("INVALID".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_application_status_display_roundtrip() {
        for status in ALL_STATUSES {
            let parsed = status.to_string().parse::<ApplicationStatus>().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        for from in ALL_STATUSES.iter().filter(|s| s.is_terminal()) {
            for to in ALL_STATUSES {
                assert!(
                    !from.can_transition_to(&to),
                    "terminal {} must not transition to {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_self_transition_is_illegal() {
        for status in ALL_STATUSES {
            assert!(!status.can_transition_to(&status));
        }
    }

    #[test]
    fn test_rejected_to_accepted_is_illegal() {
        assert!(!ApplicationStatus::Rejected.can_transition_to(&ApplicationStatus::Accepted));
    }

    #[test]
    fn test_accepted_to_pending_is_illegal() {
        assert!(!ApplicationStatus::Accepted.can_transition_to(&ApplicationStatus::Pending));
    }

    #[test]
    fn test_accepted_outgoing_edges() {
        assert!(ApplicationStatus::Accepted.can_transition_to(&ApplicationStatus::Hired));
        assert!(ApplicationStatus::Accepted.can_transition_to(&ApplicationStatus::Withdrawn));
        assert!(!ApplicationStatus::Accepted.can_transition_to(&ApplicationStatus::UnderReview));
        assert!(!ApplicationStatus::Accepted.can_transition_to(&ApplicationStatus::Rejected));
    }

    #[test]
    fn test_live_statuses_match_cap_definition() {
        let live: Vec<_> = ALL_STATUSES
            .iter()
            .filter(|s| s.counts_toward_cap())
            .collect();
        assert_eq!(
            live,
            vec![
                &ApplicationStatus::Pending,
                &ApplicationStatus::Waitlisted,
                &ApplicationStatus::Accepted,
            ]
        );
    }

    #[test]
    fn test_rejected_and_withdrawn_never_count() {
        assert!(!ApplicationStatus::Rejected.counts_toward_cap());
        assert!(!ApplicationStatus::Withdrawn.counts_toward_cap());
    }

    #[test]
    fn test_job_application_transitions() {
        use JobApplicationStatus::*;
        assert!(Pending.can_transition_to(&Interview));
        assert!(Pending.can_transition_to(&Rejected));
        assert!(Interview.can_transition_to(&Accepted));
        assert!(!Accepted.can_transition_to(&Pending));
        assert!(!Rejected.can_transition_to(&Interview));
        assert!(!Withdrawn.can_transition_to(&Accepted));
    }

    #[test]
    fn test_job_application_status_display() {
        assert_eq!(format!("{}", JobApplicationStatus::Interview), "INTERVIEW");
        assert_eq!(format!("{}", JobApplicationStatus::Withdrawn), "WITHDRAWN");
    }

    #[test]
    fn test_course_status_accepts_applications() {
        assert!(CourseStatus::Active.accepts_applications());
        assert!(!CourseStatus::Closed.accepts_applications());
        assert!(!CourseStatus::Draft.accepts_applications());
    }
}
