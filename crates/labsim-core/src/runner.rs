//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`run_tick`] for a fixed number of ticks and
//! hands every [`TickSummary`] to a [`TickCallback`], which is how the
//! engine binary writes its tabular log without the core knowing about
//! files.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::info;

use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Error type returned by tick callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The tick callback failed.
    #[error("callback failed after tick {tick}: {source}")]
    Callback {
        /// The tick whose summary was being handled.
        tick: u64,
        /// The underlying callback error.
        source: CallbackError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// The callback receives the tick summary and the state as it stands
/// between two ticks.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    ///
    /// # Errors
    ///
    /// An error stops the run with [`RunnerError::Callback`].
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState)
    -> Result<(), CallbackError>;
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(
        &mut self,
        _summary: &TickSummary,
        _state: &SimulationState,
    ) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// Run `max_ticks` ticks, calling `callback` after each one.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if a tick fails, or
/// [`RunnerError::Callback`] if the callback fails.
pub fn run_simulation(
    state: &mut SimulationState,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks,
        start_tick = state.tick(),
        labs = state.population.len(),
        "Simulation starting"
    );

    while total_ticks < max_ticks {
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        callback
            .on_tick(&summary, state)
            .map_err(|source| RunnerError::Callback {
                tick: summary.tick,
                source,
            })?;
        last_summary = Some(summary);
    }

    info!(
        total_ticks,
        labs = state.population.len(),
        "Simulation finished"
    );

    Ok(SimulationResult {
        final_summary: last_summary,
        total_ticks,
    })
}
