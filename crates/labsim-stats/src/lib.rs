//! Per-tick and windowed statistics for the lab funding simulation.
//!
//! # Modules
//!
//! - [`collector`] -- [`StatisticsCollector`]: tick counters, per-tick
//!   measures and the windowed report
//! - [`inequality`] -- Mean, population standard deviation and Gini
//! - [`window`] -- [`Window`]: bounded FIFO of per-tick values

pub mod collector;
pub mod inequality;
pub mod window;

// Re-export primary types at crate root.
pub use collector::{StatisticsCollector, StatisticsConfig};
pub use inequality::{gini, mean, mean_and_gini, stdev};
pub use window::Window;
