pub mod jobs;
pub mod publish;
pub mod queries;
pub mod submit;
pub mod transition;
