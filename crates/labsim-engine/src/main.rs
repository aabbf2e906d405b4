//! Engine binary for the lab funding simulation.
//!
//! This is the main entry point that wires together configuration,
//! structured logging, the seeded initial state, and the tick loop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `labsim-config.yaml` (or `LABSIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the configuration and build the initial state
//! 4. Run `world.max_ticks` ticks, appending the tabular log
//! 5. Write the final snapshot and log the result

mod error;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use labsim_core::config::SimulationConfig;
use labsim_core::runner;
use labsim_core::setup;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::error::EngineError;
use crate::output::CsvReporter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "labsim-config.yaml";

/// Environment variable that overrides the configuration path.
const CONFIG_ENV_VAR: &str = "LABSIM_CONFIG";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // 2. Initialize structured logging.
    init_tracing(&config);

    let run_id = Uuid::now_v7();
    let started = Utc::now();
    info!(
        %run_id,
        started = %started.to_rfc3339(),
        config = %config_path.display(),
        "labsim-engine starting"
    );
    info!(
        seed = config.world.seed,
        max_ticks = config.world.max_ticks,
        size = config.world.size,
        initial_labs = config.population.initial_labs,
        lottery = config.funding.lottery,
        "Configuration loaded"
    );

    // 3. Validate and build the initial state.
    let mut state = setup::build_state(&config).map_err(EngineError::from)?;

    // 4. Run the simulation loop.
    let output_dir = Path::new(&config.output.directory);
    let mut reporter = CsvReporter::create(output_dir, run_id, config.output.report_interval)?;
    let result = runner::run_simulation(&mut state, config.world.max_ticks, &mut reporter)
        .map_err(EngineError::from)?;
    info!(
        path = %reporter.path().display(),
        rows = reporter.rows_written(),
        "Tabular log complete"
    );

    // 5. Final snapshot and summary.
    let snapshot = state.snapshot();
    if config.output.write_final_snapshot {
        output::write_final_snapshot(output_dir, run_id, &snapshot)?;
    }

    let elapsed_ms = Utc::now().signed_duration_since(started).num_milliseconds();
    info!(
        %run_id,
        total_ticks = result.total_ticks,
        labs = snapshot.labs.len(),
        false_discovery_rate = snapshot.report.false_discovery_rate,
        total_funds_gini = snapshot.report.population.total_funds_gini,
        proportion_explored = snapshot.report.landscape.proportion_explored,
        elapsed_ms,
        "Simulation complete"
    );
    Ok(())
}

/// Configuration path: `LABSIM_CONFIG` if set, else the default file.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `logging.level`.
fn init_tracing(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
