//! Tick cycle: the ordered phase loop that drives the simulation.
//!
//! Each tick runs through these phases, always in this order:
//!
//! 1. **Population** -- reset the per-tick counters, record the highest
//!    prestige of the previous tick, run the death and birth lotteries.
//!
//! 2. **Labs** -- every active lab runs its per-tick state machine:
//!    age, funding refresh, relocation, application, research, grant
//!    consumption. Labs are visited in a fresh random order each tick.
//!    Applications go to the funding agency and publications to the
//!    statistics counters.
//!
//! 3. **Funding** -- the agency ranks (or shuffles) the applicants, spends
//!    its budget and empties the pool. Each award is credited to its lab.
//!
//! 4. **Statistics** -- the collector measures the landscape and the
//!    population and updates its windows.
//!
//! The clock advances only after the last phase. Given the same initial
//! state and seed, the tick cycle is deterministic.

use labsim_agents::{AgentError, LabContext, Population, Turnover};
use labsim_funding::{Award, FundingAgency};
use labsim_stats::StatisticsCollector;
use labsim_types::TickStatistics;
use labsim_world::Landscape;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A lab or population operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// One step of the tick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Death and birth lotteries.
    Population,
    /// Every active lab acts.
    Labs,
    /// The agency allocates grants.
    Funding,
    /// Per-tick measurement.
    Statistics,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Self; 4] = [Self::Population, Self::Labs, Self::Funding, Self::Statistics];
}

/// Summary of a single tick's execution.
///
/// [`run_phase`] fills only the fields of the phase it ran.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Who died and who was born.
    pub turnover: Turnover,
    /// Labs that ran their state machine.
    pub labs_acted: u32,
    /// Labs that applied for funding.
    pub applicants: u32,
    /// Publications made during the tick.
    pub publications: u64,
    /// Publications reporting a wrong result.
    pub false_discoveries: u64,
    /// Grants credited to labs.
    pub awards: Vec<Award>,
    /// Awards dropped because their lab no longer exists.
    pub skipped_awards: u32,
    /// End-of-tick measurement.
    pub statistics: Option<TickStatistics>,
    /// Live labs at the end of the tick.
    pub labs_alive: u32,
}

/// The mutable simulation state passed through the tick cycle.
///
/// Phases borrow the fields they own; the single seeded generator is the
/// only source of randomness.
#[derive(Debug)]
pub struct SimulationState {
    /// The simulation clock.
    pub clock: SimulationClock,
    /// Base-rate and publication grids.
    pub landscape: Landscape,
    /// Every live lab.
    pub population: Population,
    /// Per-tick applicant pool and budget.
    pub agency: FundingAgency,
    /// Per-tick counters and windowed metrics.
    pub stats: StatisticsCollector,
    /// Lab behaviour parameters.
    pub research_config: labsim_agents::ResearchConfig,
    /// Turnover parameters.
    pub population_config: labsim_agents::PopulationConfig,
    /// Seeded random stream.
    pub rng: StdRng,
}

impl SimulationState {
    /// Assemble a state at tick 0 from an existing landscape and population.
    ///
    /// Parameters and the seed come from `config`.
    pub fn from_parts(
        landscape: Landscape,
        population: Population,
        config: &SimulationConfig,
    ) -> Self {
        Self::with_rng(
            landscape,
            population,
            config,
            StdRng::seed_from_u64(config.world.seed),
        )
    }

    /// Assemble a state at tick 0 that continues an existing random stream.
    pub fn with_rng(
        landscape: Landscape,
        population: Population,
        config: &SimulationConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            clock: SimulationClock::new(),
            landscape,
            population,
            agency: FundingAgency::new(config.funding.clone()),
            stats: StatisticsCollector::new(&config.statistics),
            research_config: config.lab_research(),
            population_config: config.lab_population(),
            rng,
        }
    }

    /// The tick currently being executed (or about to be).
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }
}

/// Execute one full tick.
///
/// Runs every phase in [`Phase::ALL`] order and advances the clock.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the clock overflows, or
/// [`TickError::Agent`] if a lab cannot be created or a lab's topic lies
/// outside the landscape.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tick = state.clock.tick();
    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };
    for phase in Phase::ALL {
        execute_phase(state, phase, &mut summary)?;
    }
    summary.labs_alive = labs_alive(&state.population);
    state.clock.advance()?;

    info!(
        tick,
        labs = summary.labs_alive,
        publications = summary.publications,
        false_discoveries = summary.false_discoveries,
        awards = summary.awards.len(),
        "Tick complete"
    );
    Ok(summary)
}

/// Execute a single phase of the current tick without advancing the clock.
///
/// # Errors
///
/// Returns [`TickError::Agent`] under the same conditions as [`run_tick`].
pub fn run_phase(state: &mut SimulationState, phase: Phase) -> Result<TickSummary, TickError> {
    let mut summary = TickSummary {
        tick: state.clock.tick(),
        ..TickSummary::default()
    };
    execute_phase(state, phase, &mut summary)?;
    summary.labs_alive = labs_alive(&state.population);
    Ok(summary)
}

fn execute_phase(
    state: &mut SimulationState,
    phase: Phase,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    match phase {
        Phase::Population => phase_population(state, summary),
        Phase::Labs => phase_labs(state, summary),
        Phase::Funding => {
            phase_funding(state, summary);
            Ok(())
        }
        Phase::Statistics => {
            phase_statistics(state, summary);
            Ok(())
        }
    }
}

/// Phase 1: Population.
fn phase_population(
    state: &mut SimulationState,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let tick = state.clock.tick();
    state.stats.reset_tick();
    let highest = state.population.update_highest_prestige();
    summary.turnover = state.population.turnover(
        tick,
        &state.landscape,
        &state.population_config,
        &mut state.rng,
    )?;
    debug!(tick, highest_prestige = highest, "Population phase complete");
    Ok(())
}

/// Phase 2: Labs.
fn phase_labs(state: &mut SimulationState, summary: &mut TickSummary) -> Result<(), TickError> {
    let tick = state.clock.tick();
    let first_tick = state.clock.is_first_tick();
    let highest_prestige = state.population.highest_prestige();

    // Registration order decides funding ties, so it must not follow
    // population order.
    let mut order: Vec<usize> = (0..state.population.len()).collect();
    order.shuffle(&mut state.rng);

    for index in order {
        let Some(lab) = state.population.labs_mut().get_mut(index) else {
            continue;
        };
        if !lab.is_active(tick) {
            continue;
        }
        let mut ctx = LabContext {
            landscape: &mut state.landscape,
            config: &state.research_config,
            highest_prestige,
            first_tick,
            rng: &mut state.rng,
        };
        let turn = lab.act(&mut ctx)?;
        summary.labs_acted = summary.labs_acted.saturating_add(1);

        let research = turn.research;
        state
            .stats
            .record_publications(research.publications, research.false_discoveries);
        summary.publications = summary.publications.saturating_add(research.publications);
        summary.false_discoveries = summary
            .false_discoveries
            .saturating_add(research.false_discoveries);

        if turn.applied {
            state.agency.apply(lab.id(), lab.application_score());
            summary.applicants = summary.applicants.saturating_add(1);
        }
    }

    debug!(
        tick,
        labs_acted = summary.labs_acted,
        applicants = summary.applicants,
        publications = summary.publications,
        "Labs phase complete"
    );
    Ok(())
}

/// Phase 3: Funding.
fn phase_funding(state: &mut SimulationState, summary: &mut TickSummary) {
    let tick = state.clock.tick();
    let awards = state.agency.allocate(&mut state.rng);
    for evaluated in state.agency.evaluated() {
        if let Some(lab) = state.population.get_mut(evaluated.lab) {
            lab.set_application_score(evaluated.score);
        }
    }
    for award in &awards {
        if let Some(lab) = state.population.get_mut(award.lab) {
            lab.award(award.years);
        } else {
            warn!(tick, lab = %award.lab, years = award.years, "Award for missing lab skipped");
            summary.skipped_awards = summary.skipped_awards.saturating_add(1);
        }
    }
    summary.awards = awards;
}

/// Phase 4: Statistics.
fn phase_statistics(state: &mut SimulationState, summary: &mut TickSummary) {
    let tick = state.clock.tick();
    let stats = state
        .stats
        .measure(tick, &state.landscape, state.population.labs());
    summary.statistics = Some(stats);
}

fn labs_alive(population: &Population) -> u32 {
    u32::try_from(population.len()).unwrap_or(u32::MAX)
}
