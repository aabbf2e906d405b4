//! The epistemic landscape for the lab funding simulation.
//!
//! The landscape is a square grid of research topics. Each cell carries a
//! base rate (the probability that a hypothesis tested there is true) and a
//! publication count. Publishing on a topic can raise the base rate of the
//! topic and, with distance decay, of the topics around it.
//!
//! # Modules
//!
//! - [`error`] -- Error types for landscape access.
//! - [`landscape`] -- [`Landscape`]: flat row-major grids, checked
//!   accessors, clamping helpers and the 8-neighbourhood.
//! - [`diffusion`] -- [`increase_and_disperse`]: distance-decayed spread of
//!   a base-rate increase from one cell.

pub mod diffusion;
pub mod error;
pub mod landscape;

// Re-export primary types at crate root.
pub use diffusion::{DISPERSAL_THRESHOLD, increase_and_disperse};
pub use error::WorldError;
pub use landscape::{Landscape, MAX_BASE_RATE};
