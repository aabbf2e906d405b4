//! Funding agency and grant allocation for the lab funding simulation.
//!
//! Labs register with the agency while they act; once every lab has acted
//! the agency ranks (or shuffles) the applicants and hands out the tick's
//! budget as grants. Allocation returns [`Award`] records that the
//! scheduler applies to the labs.
//!
//! # Modules
//!
//! - [`agency`] -- [`FundingAgency`]: applicant pool, ranking or lottery,
//!   and budget spending
//! - [`config`] -- Budget and grant shape parameters ([`FundingConfig`])

pub mod agency;
pub mod config;

// Re-export primary types at crate root.
pub use agency::{Applicant, Award, FundingAgency};
pub use config::FundingConfig;
