//! Use cases for the application lifecycle: submission, status
//! transitions, admissions publication and caller-scoped queries.
//!
//! Each use case owns its dependencies as `Arc<dyn Trait>` so callers
//! can wire Postgres repositories in production and in-memory ones in
//! tests.

pub mod applications;

pub use applications::jobs::{
    SubmitJobApplicationRequest, SubmitJobApplicationResponse, SubmitJobApplicationUseCase,
    TransitionJobApplicationRequest, TransitionJobApplicationResponse,
    TransitionJobApplicationUseCase,
};
pub use applications::publish::{
    CapacityWarning, PublishAdmissionsRequest, PublishAdmissionsResponse, PublishAdmissionsUseCase,
};
pub use applications::queries::ApplicationQueries;
pub use applications::submit::{
    DocumentUpload, SubmitApplicationRequest, SubmitApplicationResponse, SubmitApplicationUseCase,
};
pub use applications::transition::{
    TransitionApplicationRequest, TransitionApplicationResponse, TransitionApplicationUseCase,
};
