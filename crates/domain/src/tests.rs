//! Unit tests for the domain layer
use crate::applications::*;
use crate::request_context::*;
use crate::shared_kernel::*;
use chrono::Utc;

mod application_aggregate_tests {
    use super::*;

    fn sample_application() -> Application {
        Application::new(
            StudentId::new(),
            CourseId::new(),
            InstitutionId::new(),
            "I want to study here".to_string(),
            vec![],
        )
    }

    #[test]
    fn test_new_application_starts_pending() {
        let app = sample_application();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert!(!app.published);
        assert!(app.admitted_at.is_none());
        assert!(app.is_live());
    }

    #[test]
    fn test_accept_stamps_admitted_at_once() {
        let mut app = sample_application();
        let now = Utc::now();
        app.transition_to(ApplicationStatus::Accepted, Some(UserId::new()), None, now)
            .unwrap();
        assert_eq!(app.admitted_at, Some(now));

        // admitted_at survives later transitions
        let later = now + chrono::Duration::seconds(30);
        app.transition_to(ApplicationStatus::Hired, Some(UserId::new()), None, later)
            .unwrap();
        assert_eq!(app.admitted_at, Some(now));
        assert_eq!(app.updated_at, later);
    }

    #[test]
    fn test_withdraw_stamps_withdrawn_at_and_is_terminal() {
        let mut app = sample_application();
        let now = Utc::now();
        app.transition_to(ApplicationStatus::Withdrawn, None, None, now)
            .unwrap();
        assert_eq!(app.withdrawn_at, Some(now));
        assert!(!app.is_live());
        assert!(app.status.is_terminal());
    }

    #[test]
    fn test_reviewer_stamp_only_when_reviewer_present() {
        let mut app = sample_application();
        let now = Utc::now();
        app.transition_to(ApplicationStatus::Withdrawn, None, None, now)
            .unwrap();
        assert!(app.reviewed_by.is_none());
        assert!(app.reviewed_at.is_none());

        let mut app = sample_application();
        let reviewer = UserId::new();
        app.transition_to(
            ApplicationStatus::UnderReview,
            Some(reviewer),
            Some("strong transcript".to_string()),
            now,
        )
        .unwrap();
        assert_eq!(app.reviewed_by, Some(reviewer));
        assert_eq!(app.reviewed_at, Some(now));
        assert_eq!(app.notes.as_deref(), Some("strong transcript"));
    }

    #[test]
    fn test_illegal_transition_is_rejected_and_leaves_state_untouched() {
        let mut app = sample_application();
        let now = Utc::now();
        app.transition_to(ApplicationStatus::Rejected, Some(UserId::new()), None, now)
            .unwrap();

        let err = app
            .transition_to(ApplicationStatus::Accepted, Some(UserId::new()), None, now)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidStatusTransition {
                from: ApplicationStatus::Rejected,
                to: ApplicationStatus::Accepted,
            }
        ));
        assert_eq!(app.status, ApplicationStatus::Rejected);
    }
}

mod job_application_tests {
    use super::*;

    #[test]
    fn test_interview_stamps_interview_at() {
        let mut app = JobApplication::new(StudentId::new(), JobPostingId::new(), CompanyId::new());
        let now = Utc::now();
        app.transition_to(JobApplicationStatus::Interview, Some(UserId::new()), None, now)
            .unwrap();
        assert_eq!(app.interview_at, Some(now));
        assert_eq!(app.status, JobApplicationStatus::Interview);
    }

    #[test]
    fn test_terminal_job_statuses_reject_further_transitions() {
        let mut app = JobApplication::new(StudentId::new(), JobPostingId::new(), CompanyId::new());
        let now = Utc::now();
        app.transition_to(JobApplicationStatus::Rejected, Some(UserId::new()), None, now)
            .unwrap();

        let err = app
            .transition_to(JobApplicationStatus::Interview, Some(UserId::new()), None, now)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidJobStatusTransition { .. }));
    }

    #[test]
    fn test_offer_note_recorded_on_accept() {
        let mut app = JobApplication::new(StudentId::new(), JobPostingId::new(), CompanyId::new());
        app.transition_to(
            JobApplicationStatus::Accepted,
            Some(UserId::new()),
            Some("offer: junior engineer".to_string()),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(app.offer_note.as_deref(), Some("offer: junior engineer"));
    }
}

mod request_context_tests {
    use super::*;

    #[test]
    fn test_context_generates_correlation_id() {
        let ctx = RequestContext::new(Caller::Student(StudentId::new()));
        assert_eq!(ctx.correlation_id().len(), 36);
    }

    #[test]
    fn test_context_propagates_correlation_id() {
        let ctx = RequestContext::with_correlation_id(
            Caller::Admin(UserId::new()),
            "req-123",
        );
        assert_eq!(ctx.correlation_id(), "req-123");
    }

    #[test]
    fn test_caller_labels() {
        let student = StudentId::new();
        assert_eq!(
            Caller::Student(student).label(),
            format!("student:{}", student)
        );

        let institution_id = InstitutionId::new();
        let caller = Caller::Institution {
            institution_id,
            reviewer_id: UserId::new(),
        };
        assert_eq!(caller.label(), format!("institution:{}", institution_id));
    }

    #[test]
    fn test_student_has_no_reviewer_id() {
        assert!(Caller::Student(StudentId::new()).reviewer_id().is_none());
        assert!(
            Caller::Company {
                company_id: CompanyId::new(),
                reviewer_id: UserId::new(),
            }
            .reviewer_id()
            .is_some()
        );
    }
}

mod event_tests {
    use super::*;
    use crate::events::DomainEvent;

    #[test]
    fn test_event_type_names() {
        let event = DomainEvent::ApplicationSubmitted {
            application_id: ApplicationId::new(),
            student_id: StudentId::new(),
            course_id: CourseId::new(),
            institution_id: InstitutionId::new(),
            occurred_at: Utc::now(),
            correlation_id: None,
            actor: None,
        };
        assert_eq!(event.event_type(), "application.submitted");
        assert!(event.recipient().is_some());
    }

    #[test]
    fn test_publish_event_has_no_single_recipient() {
        let event = DomainEvent::AdmissionsPublished {
            institution_id: InstitutionId::new(),
            course_id: CourseId::new(),
            published_count: 3,
            occurred_at: Utc::now(),
            correlation_id: Some("req-1".to_string()),
            actor: Some("institution:test".to_string()),
        };
        assert_eq!(event.event_type(), "admissions.published");
        assert!(event.recipient().is_none());
    }
}
