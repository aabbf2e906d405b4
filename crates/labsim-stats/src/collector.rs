//! Tick counters, per-tick measures and the windowed report.
//!
//! The collector is reset at the start of every tick, counts publications
//! while labs act, and measures the landscape and the population once the
//! funding round is over. Each measurement is pushed into two windows:
//! lab and false-discovery metrics use `window_size`, landscape metrics
//! use the longer `landscape_window_size`.
//!
//! The reported false discovery rate is pooled over the window
//! (`sum(false) / sum(publications)`); every other reported metric is the
//! mean of the buffered per-tick values.

use labsim_agents::Lab;
use labsim_types::{LandscapeMeasures, PopulationMeasures, StatisticsReport, TickStatistics};
use labsim_world::Landscape;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::inequality::{count_to_f64, mean, mean_and_gini, stdev, tally_to_f64};
use crate::window::Window;

/// Window sizes for the statistics collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Ticks aggregated for lab and false-discovery metrics (default: 10).
    pub window_size: usize,
    /// Ticks aggregated for landscape metrics (default: 100).
    pub landscape_window_size: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            landscape_window_size: 100,
        }
    }
}

/// Accumulates per-tick metrics and produces windowed reports.
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    tick_publications: u64,
    tick_false_discoveries: u64,
    ticks: Window<TickStatistics>,
    landscape: Window<LandscapeMeasures>,
}

impl StatisticsCollector {
    /// Create a collector with empty windows.
    pub fn new(config: &StatisticsConfig) -> Self {
        Self {
            tick_publications: 0,
            tick_false_discoveries: 0,
            ticks: Window::new(config.window_size),
            landscape: Window::new(config.landscape_window_size),
        }
    }

    /// Zero the per-tick counters.
    pub const fn reset_tick(&mut self) {
        self.tick_publications = 0;
        self.tick_false_discoveries = 0;
    }

    /// Count publications made during the current tick.
    pub const fn record_publications(&mut self, publications: u64, false_discoveries: u64) {
        self.tick_publications = self.tick_publications.saturating_add(publications);
        self.tick_false_discoveries = self
            .tick_false_discoveries
            .saturating_add(false_discoveries);
    }

    /// Publications counted so far this tick.
    pub const fn tick_publications(&self) -> u64 {
        self.tick_publications
    }

    /// False discoveries counted so far this tick.
    pub const fn tick_false_discoveries(&self) -> u64 {
        self.tick_false_discoveries
    }

    /// Measure the end-of-tick state and push it into the windows.
    pub fn measure(&mut self, tick: u64, landscape: &Landscape, labs: &[Lab]) -> TickStatistics {
        let stats = TickStatistics {
            tick,
            publications: self.tick_publications,
            false_discoveries: self.tick_false_discoveries,
            false_discovery_rate: ratio(self.tick_false_discoveries, self.tick_publications),
            landscape: measure_landscape(landscape),
            population: measure_population(labs),
        };
        self.ticks.push(stats);
        self.landscape.push(stats.landscape);
        trace!(
            tick,
            publications = stats.publications,
            false_discoveries = stats.false_discoveries,
            "tick measured"
        );
        stats
    }

    /// Metrics of the most recently measured tick.
    pub fn latest(&self) -> Option<TickStatistics> {
        self.ticks.latest().copied()
    }

    /// Windowed report as of the most recently measured tick.
    pub fn report(&self) -> StatisticsReport {
        let (publications, false_discoveries) =
            self.ticks.iter().fold((0_u64, 0_u64), |(p, f), t| {
                (
                    p.saturating_add(t.publications),
                    f.saturating_add(t.false_discoveries),
                )
            });

        let w = &self.ticks;
        let l = &self.landscape;
        StatisticsReport {
            tick: self.latest().map_or(0, |t| t.tick),
            false_discovery_rate: ratio(false_discoveries, publications),
            publications_per_tick: w.mean_by(|t| tally_to_f64(t.publications)),
            landscape: LandscapeMeasures {
                mean_base_rate: l.mean_by(|m| m.mean_base_rate),
                base_rate_stdev: l.mean_by(|m| m.base_rate_stdev),
                proportion_explored: l.mean_by(|m| m.proportion_explored),
                mean_publications: l.mean_by(|m| m.mean_publications),
                publications_stdev: l.mean_by(|m| m.publications_stdev),
            },
            population: PopulationMeasures {
                mean_total_funds: w.mean_by(|t| t.population.mean_total_funds),
                total_funds_stdev: w.mean_by(|t| t.population.total_funds_stdev),
                total_funds_gini: w.mean_by(|t| t.population.total_funds_gini),
                mean_postdocs: w.mean_by(|t| t.population.mean_postdocs),
                postdocs_stdev: w.mean_by(|t| t.population.postdocs_stdev),
                postdocs_gini: w.mean_by(|t| t.population.postdocs_gini),
                mean_grant_duration: w.mean_by(|t| t.population.mean_grant_duration),
                grant_duration_stdev: w.mean_by(|t| t.population.grant_duration_stdev),
                grant_duration_gini: w.mean_by(|t| t.population.grant_duration_gini),
                mean_effort: w.mean_by(|t| t.population.mean_effort),
                labs: w.mean_by(|t| t.population.labs),
            },
        }
    }
}

/// `numerator / denominator`, zero when the denominator is zero.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        tally_to_f64(numerator) / tally_to_f64(denominator)
    }
}

fn measure_landscape(landscape: &Landscape) -> LandscapeMeasures {
    let rates = landscape.base_rates();
    let pubs: Vec<f64> = landscape
        .publication_counts()
        .iter()
        .map(|&p| tally_to_f64(p))
        .collect();
    let explored = landscape.publication_counts().iter().filter(|&&p| p > 0).count();
    LandscapeMeasures {
        mean_base_rate: mean(rates),
        base_rate_stdev: stdev(rates),
        proportion_explored: if rates.is_empty() {
            0.0
        } else {
            count_to_f64(explored) / count_to_f64(rates.len())
        },
        mean_publications: mean(&pubs),
        publications_stdev: stdev(&pubs),
    }
}

fn measure_population(labs: &[Lab]) -> PopulationMeasures {
    let funds: Vec<f64> = labs.iter().map(|l| tally_to_f64(l.total_funds())).collect();
    let postdocs: Vec<f64> = labs.iter().map(|l| count_to_f64(l.grants().len())).collect();
    let durations: Vec<f64> = labs
        .iter()
        .flat_map(Lab::grants)
        .filter(|g| !g.is_expired())
        .map(|g| f64::from(g.years_remaining))
        .collect();
    let efforts: Vec<f64> = labs.iter().map(Lab::effort).collect();

    let (mean_total_funds, total_funds_gini) = mean_and_gini(&funds);
    let (mean_postdocs, postdocs_gini) = mean_and_gini(&postdocs);
    let (mean_grant_duration, grant_duration_gini) = mean_and_gini(&durations);
    PopulationMeasures {
        mean_total_funds,
        total_funds_stdev: stdev(&funds),
        total_funds_gini,
        mean_postdocs,
        postdocs_stdev: stdev(&postdocs),
        postdocs_gini,
        mean_grant_duration,
        grant_duration_stdev: stdev(&durations),
        grant_duration_gini,
        mean_effort: mean(&efforts),
        labs: count_to_f64(labs.len()),
    }
}
