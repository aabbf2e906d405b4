//! Tabular log and final snapshot output.
//!
//! [`CsvReporter`] appends one row of windowed metrics every
//! `report_interval` ticks. The file is opened for each row and closed
//! again before the next tick runs, so a crashed run keeps every row
//! written so far.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use labsim_core::runner::{CallbackError, TickCallback};
use labsim_core::tick::{SimulationState, TickSummary};
use labsim_types::{SimulationSnapshot, StatisticsReport};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineError;

/// Tick callback that writes the append-only tabular log.
pub struct CsvReporter {
    path: PathBuf,
    interval: u64,
    rows_written: u64,
}

impl CsvReporter {
    /// Create a reporter writing to `<directory>/run-<run_id>.csv`.
    ///
    /// The directory is created if missing. The file itself is created on
    /// the first row.
    pub fn create(directory: &Path, run_id: Uuid, interval: u64) -> Result<Self, EngineError> {
        fs::create_dir_all(directory)?;
        Ok(Self {
            path: directory.join(format!("run-{run_id}.csv")),
            interval: interval.max(1),
            rows_written: 0,
        })
    }

    /// Path of the tabular log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended so far.
    pub const fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Whether `tick` gets a row.
    pub const fn is_reporting_tick(&self, tick: u64) -> bool {
        matches!(tick.checked_rem(self.interval), Some(0))
    }

    /// Append one row, writing the header first if the file is new.
    pub fn append(&mut self, report: &StatisticsReport) -> Result<(), std::io::Error> {
        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);
        if is_new {
            writeln!(out, "{}", StatisticsReport::COLUMNS.join(","))?;
        }
        write!(out, "{}", report.tick)?;
        for value in report.values() {
            write!(out, ",{value}")?;
        }
        writeln!(out)?;
        out.flush()?;
        self.rows_written = self.rows_written.saturating_add(1);
        Ok(())
    }
}

impl TickCallback for CsvReporter {
    fn on_tick(
        &mut self,
        summary: &TickSummary,
        state: &SimulationState,
    ) -> Result<(), CallbackError> {
        if !self.is_reporting_tick(summary.tick) {
            return Ok(());
        }
        let report = state.stats.report();
        self.append(&report)?;
        debug!(
            tick = summary.tick,
            fdr = report.false_discovery_rate,
            labs = report.population.labs,
            "Report row written"
        );
        Ok(())
    }
}

/// Write `snapshot` to `<directory>/run-<run_id>-final.json`.
pub fn write_final_snapshot(
    directory: &Path,
    run_id: Uuid,
    snapshot: &SimulationSnapshot,
) -> Result<PathBuf, EngineError> {
    fs::create_dir_all(directory)?;
    let path = directory.join(format!("run-{run_id}-final.json"));
    let file = fs::File::create(&path)?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, snapshot)?;
    out.flush()?;
    info!(path = %path.display(), "Final snapshot written");
    Ok(path)
}
