//! Value structs shared by the simulation crates.
//!
//! Covers grid coordinates ([`Topic`]), [`Grant`] records, and the
//! read-only views that the core hands to external collaborators once per
//! tick: [`LabView`], [`LandscapeSnapshot`], [`TickStatistics`],
//! [`StatisticsReport`] and the bundling [`SimulationSnapshot`].

use serde::{Deserialize, Serialize};

use crate::ids::LabId;

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A cell on the square topic landscape.
///
/// Coordinates are zero-based; `x` indexes columns and `y` indexes rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Topic {
    /// Column on the landscape.
    pub x: u32,
    /// Row on the landscape.
    pub y: u32,
}

impl Topic {
    /// Create a topic at `(x, y)`.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two topics.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

impl core::fmt::Display for Topic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Grant
// ---------------------------------------------------------------------------

/// A funding grant held by a lab.
///
/// Each grant pays for one postdoc while it has years remaining. The lab
/// decrements every grant once per tick and drops grants that reached zero
/// at its next refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    /// Years of funding left.
    pub years_remaining: u32,
}

impl Grant {
    /// Create a grant lasting `years`.
    pub const fn new(years: u32) -> Self {
        Self {
            years_remaining: years,
        }
    }

    /// Whether the grant has run out and should be dropped.
    pub const fn is_expired(self) -> bool {
        self.years_remaining == 0
    }

    /// Consume one year of funding, saturating at zero.
    pub const fn tick_down(&mut self) {
        self.years_remaining = self.years_remaining.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Lab view
// ---------------------------------------------------------------------------

/// Read-only projection of a single lab for external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabView {
    /// Lab identifier.
    pub id: LabId,
    /// Lab this one was born from, `None` for seed labs.
    pub parent: Option<LabId>,
    /// Current research topic.
    pub topic: Topic,
    /// Ticks lived.
    pub age: u64,
    /// Accumulated publication credit.
    pub prestige: f64,
    /// Researchers funded beyond the principal investigator.
    pub postdocs: u32,
    /// Remaining years of every grant held.
    pub grant_years: Vec<u32>,
    /// Research effort in `[1, 100]`.
    pub effort: f64,
    /// Score the agency ranked in the most recent funding round, including
    /// evaluation noise.
    pub application_score: f64,
}

// ---------------------------------------------------------------------------
// Landscape snapshot
// ---------------------------------------------------------------------------

/// Flat copy of both landscape grids.
///
/// Both vectors are row-major with `size * size` entries: the cell at
/// `(x, y)` lives at index `y * size + x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeSnapshot {
    /// Side length of the square grid.
    pub size: u32,
    /// Base rate of true hypotheses per cell.
    pub base_rates: Vec<f64>,
    /// Publication count per cell.
    pub publications: Vec<u64>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Summary measures over the landscape grids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandscapeMeasures {
    /// Mean base rate over all cells.
    pub mean_base_rate: f64,
    /// Population standard deviation of the base rate.
    pub base_rate_stdev: f64,
    /// Share of cells with at least one publication.
    pub proportion_explored: f64,
    /// Mean publication count per cell.
    pub mean_publications: f64,
    /// Population standard deviation of the publication count.
    pub publications_stdev: f64,
}

/// Summary measures over the lab population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationMeasures {
    /// Mean total funds (sum of remaining grant-years) per lab.
    pub mean_total_funds: f64,
    /// Standard deviation of total funds.
    pub total_funds_stdev: f64,
    /// Gini coefficient of total funds.
    pub total_funds_gini: f64,
    /// Mean postdoc count per lab.
    pub mean_postdocs: f64,
    /// Standard deviation of the postdoc count.
    pub postdocs_stdev: f64,
    /// Gini coefficient of the postdoc count.
    pub postdocs_gini: f64,
    /// Mean remaining duration over every grant held.
    pub mean_grant_duration: f64,
    /// Standard deviation of remaining grant duration.
    pub grant_duration_stdev: f64,
    /// Gini coefficient of remaining grant duration.
    pub grant_duration_gini: f64,
    /// Mean research effort.
    pub mean_effort: f64,
    /// Number of live labs.
    pub labs: f64,
}

/// Instantaneous metrics for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStatistics {
    /// Tick these metrics describe.
    pub tick: u64,
    /// Publications made during the tick.
    pub publications: u64,
    /// Publications during the tick whose claim was wrong.
    pub false_discoveries: u64,
    /// `false_discoveries / publications`, zero without publications.
    pub false_discovery_rate: f64,
    /// Landscape measures after the tick.
    pub landscape: LandscapeMeasures,
    /// Population measures after the tick.
    pub population: PopulationMeasures,
}

/// Windowed metrics reported to the tabular log.
///
/// The false discovery rate is the pooled ratio over the window; every
/// other field is the arithmetic mean of the buffered per-tick values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Tick at which the report was taken.
    pub tick: u64,
    /// Pooled false discovery rate over the window.
    pub false_discovery_rate: f64,
    /// Mean publications per tick over the window.
    pub publications_per_tick: f64,
    /// Windowed landscape measures.
    pub landscape: LandscapeMeasures,
    /// Windowed population measures.
    pub population: PopulationMeasures,
}

impl StatisticsReport {
    /// Column names of a tabular log row, in output order.
    pub const COLUMNS: [&'static str; 19] = [
        "tick",
        "false_discovery_rate",
        "publications_per_tick",
        "mean_base_rate",
        "base_rate_stdev",
        "proportion_explored",
        "mean_publications",
        "publications_stdev",
        "mean_total_funds",
        "total_funds_stdev",
        "total_funds_gini",
        "mean_postdocs",
        "postdocs_stdev",
        "postdocs_gini",
        "mean_grant_duration",
        "grant_duration_stdev",
        "grant_duration_gini",
        "mean_effort",
        "labs",
    ];

    /// Metric values in [`Self::COLUMNS`] order, excluding the leading tick.
    pub const fn values(&self) -> [f64; 18] {
        let l = &self.landscape;
        let p = &self.population;
        [
            self.false_discovery_rate,
            self.publications_per_tick,
            l.mean_base_rate,
            l.base_rate_stdev,
            l.proportion_explored,
            l.mean_publications,
            l.publications_stdev,
            p.mean_total_funds,
            p.total_funds_stdev,
            p.total_funds_gini,
            p.mean_postdocs,
            p.postdocs_stdev,
            p.postdocs_gini,
            p.mean_grant_duration,
            p.grant_duration_stdev,
            p.grant_duration_gini,
            p.mean_effort,
            p.labs,
        ]
    }
}

// ---------------------------------------------------------------------------
// Simulation snapshot
// ---------------------------------------------------------------------------

/// Everything an external collaborator may read about the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Current tick (number of ticks completed).
    pub tick: u64,
    /// Every live lab, in scheduling order.
    pub labs: Vec<LabView>,
    /// Both landscape grids.
    pub landscape: LandscapeSnapshot,
    /// Metrics of the most recent tick, if any tick has run.
    pub latest: Option<TickStatistics>,
    /// Windowed metrics as of the most recent tick.
    pub report: StatisticsReport,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn grant_counts_down_and_expires() {
        let mut grant = Grant::new(2);
        assert!(!grant.is_expired());
        grant.tick_down();
        grant.tick_down();
        assert!(grant.is_expired());
        grant.tick_down();
        assert_eq!(grant.years_remaining, 0);
    }

    #[test]
    fn topic_distance_is_euclidean() {
        let a = Topic::new(0, 0);
        let b = Topic::new(3, 4);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!((Topic::new(1, 1).distance(Topic::new(2, 2)) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn columns_align_with_values() {
        let report = StatisticsReport::default();
        assert_eq!(StatisticsReport::COLUMNS.len(), report.values().len() + 1);
        assert_eq!(StatisticsReport::COLUMNS.first().copied(), Some("tick"));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = SimulationSnapshot {
            tick: 3,
            labs: vec![LabView {
                id: LabId::new(0),
                parent: None,
                topic: Topic::new(1, 2),
                age: 3,
                prestige: 1.5,
                postdocs: 1,
                grant_years: vec![4],
                effort: 75.0,
                application_score: 0.25,
            }],
            landscape: LandscapeSnapshot {
                size: 1,
                base_rates: vec![0.1],
                publications: vec![0],
            },
            latest: None,
            report: StatisticsReport::default(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SimulationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
