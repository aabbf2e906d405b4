//! Shared type definitions for the lab funding landscape simulation.
//!
//! This crate is the single source of truth for the value types that cross
//! crate boundaries: identifiers, grid coordinates, grants, and the
//! read-only views handed to external collaborators (visualization, the
//! tabular log writer) once per tick.
//!
//! # Modules
//!
//! - [`ids`] -- Monotonic numeric identifiers ([`LabId`])
//! - [`enums`] -- Enumeration types shared by configuration and engine
//! - [`structs`] -- Coordinates, grants, lab views, statistics and snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::EffortMutationTarget;
pub use ids::LabId;
pub use structs::{
    Grant, LabView, LandscapeMeasures, LandscapeSnapshot, PopulationMeasures, SimulationSnapshot,
    StatisticsReport, TickStatistics, Topic,
};
