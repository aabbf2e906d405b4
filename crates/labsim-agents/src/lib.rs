//! Lab state, research, and population turnover for the lab funding
//! simulation.
//!
//! This crate contains the logic layer for labs: everything that operates
//! on lab state and the landscape without touching I/O or the funding
//! agency. It sits between `labsim-types`/`labsim-world` and the core
//! scheduler, which wires labs to the agency and the statistics collector.
//!
//! # Modules
//!
//! - [`config`] -- Tunables for lab behaviour and population turnover
//!   ([`ResearchConfig`], [`PopulationConfig`])
//! - [`death`] -- The oldest-of-a-sample death lottery
//! - [`error`] -- Error types for all lab operations ([`AgentError`])
//! - [`lab`] -- The [`Lab`] record and its per-tick state machine
//! - [`population`] -- The live lab collection ([`Population`]) and the
//!   one-death-one-birth turnover
//! - [`reproduction`] -- Postdoc-weighted parent selection and offspring
//!   creation with topic and effort mutation
//! - [`research`] -- Research attempts, peer review and publication
//! - [`sampling`] -- Random draws shared by the lotteries (Gaussian,
//!   weighted index, distinct sample)

pub mod config;
pub mod death;
pub mod error;
pub mod lab;
pub mod population;
pub mod reproduction;
pub mod research;
pub mod sampling;

// Re-export primary types at crate root for convenience.
pub use config::{PopulationConfig, ResearchConfig};
pub use death::select_for_death;
pub use error::AgentError;
pub use lab::{Lab, LabContext, LabTurn, MAX_EFFORT, MIN_EFFORT};
pub use population::{Population, Turnover};
pub use reproduction::{select_parent, spawn_offspring};
pub use research::ResearchOutcome;
