//! Error types for the labsim-agents crate.
//!
//! Steady-state lab operations are infallible apart from landscape access
//! and identifier exhaustion; both surface as [`AgentError`].

use labsim_types::LabId;
use labsim_world::WorldError;

/// Errors that can occur during lab and population operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A landscape access failed.
    #[error("landscape error: {0}")]
    World(#[from] WorldError),

    /// The monotonic lab identifier counter overflowed.
    #[error("lab identifiers exhausted after {0}")]
    IdsExhausted(LabId),
}
