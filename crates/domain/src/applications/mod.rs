//! Application lifecycle bounded context

pub mod aggregate;
pub mod eligibility;

pub use aggregate::*;
pub use eligibility::*;
