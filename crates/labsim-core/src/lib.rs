//! Simulation clock, configuration, setup, and the tick scheduler for the
//! lab funding simulation.
//!
//! This crate owns the single mutable [`SimulationState`] and the ordered
//! phase list that drives it: Population, Labs, Funding, Statistics.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with checked advancement.
//! - [`config`] -- Configuration loading from `labsim-config.yaml` into
//!   strongly-typed structs, plus fail-fast validation.
//! - [`setup`] -- Seeded construction of the initial landscape and labs.
//! - [`tick`] -- The phase scheduler ([`run_tick`], [`run_phase`]).
//! - [`runner`] -- Bounded run loop with per-tick callbacks.
//! - [`snapshot`] -- Read-only [`SimulationSnapshot`] assembly.
//!
//! [`SimulationState`]: tick::SimulationState
//! [`run_tick`]: tick::run_tick
//! [`run_phase`]: tick::run_phase
//! [`SimulationSnapshot`]: labsim_types::SimulationSnapshot

pub mod clock;
pub mod config;
pub mod runner;
pub mod setup;
pub mod snapshot;
pub mod tick;
